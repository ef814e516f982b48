use actix_web::{
    body::BoxBody,
    error, get,
    http::{header::ContentType, StatusCode},
    post, web, App, HttpResponse, HttpServer,
};
use counter_lib::strategy::StrategyFile;
use counter_sim::prelude::*;
use counter_sim::write::{self, SummaryReport};
use serde::Deserialize;
use std::sync::Mutex;
use thiserror::Error;

type AppSimulator = web::Data<Mutex<Option<MulStrategyBlackjackSimulator>>>;

/// The house parameters of a simulator. Meant to be deserialized from JSON.
#[derive(Debug, Deserialize)]
struct GameConfig {
    num_decks: u32,
    decks_cut: Option<f64>,
    num_simulations: u32,
    rounds_per_simulation: u32,
    seed: Option<u64>,
    surrender: Option<bool>,
    insurance: Option<bool>,
    soft_seventeen: Option<bool>,
    blackjack_payout: Option<f64>,
}

impl From<GameConfig> for BlackjackSimulatorConfig {
    fn from(value: GameConfig) -> Self {
        let mut builder = BlackjackSimulatorConfig::new();
        builder
            .num_decks(value.num_decks)
            .num_simulations(value.num_simulations)
            .rounds_per_simulation(value.rounds_per_simulation)
            .surrender(value.surrender.unwrap_or(true))
            .insurance(value.insurance.unwrap_or(true))
            .soft_seventeen(value.soft_seventeen.unwrap_or(false))
            .blackjack_payout(value.blackjack_payout.unwrap_or(1.5));
        if let Some(cut) = value.decks_cut {
            builder.decks_cut(cut);
        }
        if let Some(seed) = value.seed {
            builder.seed(seed);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PlayerKind {
    Counter,
    Basic,
    Random,
}

/// A player to add to the simulator, the built-in strategy is used when none is given.
#[derive(Debug, Deserialize)]
struct SimConfig {
    player: PlayerKind,
    label: Option<String>,
    strategy: Option<StrategyFile>,
    seed: Option<u64>,
}

/// Errors reported back to the client.
#[derive(Debug, Error)]
enum UserError {
    #[error("an internal error occured")]
    InternalError,
    #[error("{0}")]
    SimulationCreationError(String),
    #[error("unable to add simulation, a simulator has not been created")]
    SimulatorNotCreated,
    #[error("{0}")]
    BadInput(String),
}

impl error::ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::SimulationCreationError(_) => StatusCode::BAD_REQUEST,
            UserError::SimulatorNotCreated => StatusCode::BAD_REQUEST,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn add_player(simulator: &mut MulStrategyBlackjackSimulator, params: SimConfig) -> Result<(), SimulationError> {
    let strategy = match params.strategy {
        Some(file) => StrategyConfig::try_from(file)?,
        None => StrategyConfig::default(),
    };
    let label = params.label.as_deref();
    match params.player {
        PlayerKind::Counter => {
            let counter = Counter::new(&strategy);
            match label {
                Some(label) => simulator.add_simulation(counter.with_label(label)),
                None => simulator.add_simulation(counter),
            }
        }
        PlayerKind::Basic => {
            let basic = BasicPlayer::new(&strategy);
            match label {
                Some(label) => simulator.add_simulation(basic.with_label(label)),
                None => simulator.add_simulation(basic),
            }
        }
        PlayerKind::Random => simulator.add_simulation(RandomPlayer::new(&strategy, params.seed)),
    }
}

/// Replaces the current simulator with an empty one built from the request body.
#[post("/config-game-params")]
async fn configure_simulation_parameters(
    params: web::Json<GameConfig>,
    app_sim: AppSimulator,
) -> Result<HttpResponse, UserError> {
    let config = BlackjackSimulatorConfig::from(params.into_inner());
    let simulator = MulStrategyBlackjackSimulator::new(config)
        .build()
        .map_err(|e| UserError::BadInput(e.to_string()))?;
    let mut guard = app_sim.lock().map_err(|_| UserError::InternalError)?;
    *guard = Some(simulator);
    log::info!("simulator created with {:?}", config);
    Ok(HttpResponse::Ok().body("simulator created successfully"))
}

#[post("/add-sim")]
async fn add_simulation(
    sim_params: web::Json<SimConfig>,
    app_sim: AppSimulator,
) -> Result<HttpResponse, UserError> {
    let mut guard = app_sim.lock().map_err(|_| UserError::InternalError)?;
    let simulator = guard.as_mut().ok_or(UserError::SimulatorNotCreated)?;
    add_player(simulator, sim_params.into_inner())
        .map_err(|e| UserError::SimulationCreationError(e.to_string()))?;
    Ok(HttpResponse::Ok().body("simulation added successfully"))
}

/// Runs every added simulation and returns the summaries as JSON. The simulations are used up,
/// players have to be added again before the next run.
#[get("/run-sim")]
async fn run_simulation(app_sim: AppSimulator) -> Result<HttpResponse, UserError> {
    let mut guard = app_sim.lock().map_err(|_| UserError::InternalError)?;
    let simulator = guard.as_mut().ok_or(UserError::SimulatorNotCreated)?;
    if simulator.simulations().is_empty() {
        return Err(UserError::BadInput(String::from(
            "no simulations have been added, unable to run.",
        )));
    }

    let summaries = simulator.run_with(write::collect_summaries).map_err(|e| {
        log::error!("simulation failed: {}", e);
        UserError::InternalError
    })?;
    let reports: Vec<SummaryReport> = write::reports(summaries);
    let body = serde_json::to_string(&reports).map_err(|_| UserError::InternalError)?;
    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

#[get("/default-strategy")]
async fn default_strategy() -> Result<HttpResponse, UserError> {
    let body = StrategyConfig::default()
        .to_json_pretty()
        .map_err(|_| UserError::InternalError)?;
    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let address = "127.0.0.1";
    let port = 8080;
    log::info!("listening at {}:{}", address, port);

    let app_sim: AppSimulator = web::Data::new(Mutex::new(None));

    HttpServer::new(move || {
        App::new()
            .app_data(app_sim.clone())
            .service(configure_simulation_parameters)
            .service(add_simulation)
            .service(run_simulation)
            .service(default_strategy)
    })
    .bind((address, port))?
    .run()
    .await
}
