use crate::game::shoe::Shoe;
use crate::SimulationError;
use counter_lib::prelude::{Face, Hand, Player};
use serde::Serialize;
use std::fmt::Display;

/// House rules for a simulated table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRules {
    /// Late surrender, half the bet is returned.
    pub surrender: bool,
    /// Insurance against an ace upcard, staked at half the bet and paying 2:1.
    pub insurance: bool,
    pub hit_soft_seventeen: bool,
    pub blackjack_payout: f64,
}

impl Default for TableRules {
    fn default() -> Self {
        TableRules {
            surrender: true,
            insurance: true,
            hit_soft_seventeen: false,
            blackjack_payout: 1.5,
        }
    }
}

/// How a single player hand ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Blackjack,
    Win,
    Push,
    Loss,
    Bust,
    Surrender,
}

/// A settled player hand.
#[derive(Debug, Clone)]
pub struct HandResult {
    pub hand: Hand,
    pub stake: f64,
    pub payoff: f64,
    pub outcome: Outcome,
    pub doubled: bool,
}

/// Everything that happened in one round at the table.
#[derive(Debug, Clone)]
pub struct RoundLog {
    pub shuffled: bool,
    /// The true count when the bet was placed.
    pub true_count: f64,
    pub bet: f64,
    pub insurance: f64,
    pub insurance_payoff: f64,
    pub split: bool,
    pub upcard: Face,
    pub dealer: Hand,
    pub hands: Vec<HandResult>,
}

impl RoundLog {
    fn new(shuffled: bool, true_count: f64, bet: f64, upcard: Face) -> Self {
        RoundLog {
            shuffled,
            true_count,
            bet,
            insurance: 0.0,
            insurance_payoff: 0.0,
            split: false,
            upcard,
            dealer: Hand::new(),
            hands: Vec::new(),
        }
    }

    /// Money put on the table this round, insurance included.
    pub fn wagered(&self) -> f64 {
        self.insurance + self.hands.iter().map(|h| h.stake).sum::<f64>()
    }

    /// Money handed back to the player this round, stakes included.
    pub fn payoff(&self) -> f64 {
        self.insurance_payoff + self.hands.iter().map(|h| h.payoff).sum::<f64>()
    }

    pub fn net(&self) -> f64 {
        self.payoff() - self.wagered()
    }
}

impl Display for RoundLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.shuffled {
            writeln!(f, "-- new shoe --")?;
        }
        writeln!(
            f,
            "true count {:.2}, bet {:.2}, upcard {}",
            self.true_count, self.bet, self.upcard
        )?;
        if self.insurance > 0.0 {
            writeln!(
                f,
                "insurance {:.2}, paid {:.2}",
                self.insurance, self.insurance_payoff
            )?;
        }
        for result in &self.hands {
            writeln!(
                f,
                "player {}: {:?}{}, stake {:.2}, paid {:.2}",
                result.hand,
                result.outcome,
                if result.doubled { " (doubled)" } else { "" },
                result.stake,
                result.payoff
            )?;
        }
        write!(f, "dealer {}, net {:+.2}", self.dealer, self.net())
    }
}

/// A player hand still in play.
struct SeatHand {
    hand: Hand,
    stake: f64,
    doubled: bool,
    finished: bool,
}

impl SeatHand {
    fn new(hand: Hand, stake: f64) -> Self {
        SeatHand {
            hand,
            stake,
            doubled: false,
            finished: false,
        }
    }

    fn settle(self, outcome: Outcome, payoff: f64) -> HandResult {
        HandResult {
            hand: self.hand,
            stake: self.stake,
            payoff,
            outcome,
            doubled: self.doubled,
        }
    }
}

/// A single seat blackjack table. The table owns the shoe and drives the player through each round,
/// showing the player every card that is turned face up.
#[derive(Debug, Clone)]
pub struct BlackjackTableSim {
    shoe: Shoe,
    rules: TableRules,
    needs_shuffle: bool,
}

impl BlackjackTableSim {
    pub fn new(shoe: Shoe, rules: TableRules) -> Self {
        BlackjackTableSim {
            shoe,
            rules,
            needs_shuffle: true,
        }
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Forces a fresh shuffle before the next round.
    pub fn new_shoe(&mut self) {
        self.needs_shuffle = true;
    }

    /// Deals the next card, reshuffling the discards first if the shoe ran dry in the middle of the round.
    fn draw(&mut self, player: &mut dyn Player) -> Result<Face, SimulationError> {
        if self.shoe.remaining() == 0 {
            self.shoe.reshuffle_discards()?;
            player.shuffle(self.shoe.decks() as f64);
        }
        self.shoe.deal()
    }

    fn deal_face_up(&mut self, player: &mut dyn Player) -> Result<Face, SimulationError> {
        let face = self.draw(player)?;
        player.show_card(face)?;
        Ok(face)
    }

    fn dealer_hits(&self, dealer: &Hand) -> bool {
        let value = dealer.value();
        value < 17 || (self.rules.hit_soft_seventeen && value == 17 && dealer.is_soft())
    }

    /// Plays one round for `player`: shuffle if the cut card came out, bet, deal, offer insurance and peek,
    /// then surrender, split, double and the hit/stand loop, then the dealer hand and settlement.
    pub fn play_round(&mut self, player: &mut dyn Player) -> Result<RoundLog, SimulationError> {
        let shuffled = self.needs_shuffle || self.shoe.reached_cut();
        if shuffled {
            self.shoe.shuffle();
            player.shuffle(self.shoe.decks() as f64);
            self.shoe.burn()?;
            self.needs_shuffle = false;
        }
        self.shoe.start_round();

        let true_count = player.true_count();
        let bet = player.bet_amount().min(player.bankrole());
        if !(bet > 0.0) {
            return Err(SimulationError::Table(format!(
                "{} cannot place a bet of {:.2}",
                player.label(),
                bet
            )));
        }
        player.make_bet(bet);

        let mut hand = Hand::new();
        hand.push(self.deal_face_up(player)?);
        let hole = self.draw(player)?;
        hand.push(self.deal_face_up(player)?);
        let upcard = self.deal_face_up(player)?;
        let mut dealer = Hand::from(vec![hole, upcard]);
        let mut log = RoundLog::new(shuffled, true_count, bet, upcard);

        if self.rules.insurance
            && upcard == Face::Ace
            && player.bankrole() >= bet / 2.0
            && player.accepts_insurance(&hand, upcard)?
        {
            log.insurance = bet / 2.0;
            player.make_bet(log.insurance);
        }

        if matches!(upcard, Face::Ace | Face::Ten) && dealer.is_blackjack() {
            player.show_card(hole)?;
            if log.insurance > 0.0 {
                log.insurance_payoff = 3.0 * log.insurance;
                player.receive_payoff(log.insurance_payoff);
            }
            let seat = SeatHand::new(hand, bet);
            let result = if seat.hand.is_blackjack() {
                player.receive_payoff(bet);
                seat.settle(Outcome::Push, bet)
            } else {
                seat.settle(Outcome::Loss, 0.0)
            };
            log.dealer = dealer;
            log.hands.push(result);
            return Ok(self.finish(player, log));
        }

        if hand.is_blackjack() {
            player.show_card(hole)?;
            let payoff = bet + bet * self.rules.blackjack_payout;
            player.receive_payoff(payoff);
            log.dealer = dealer;
            log.hands
                .push(SeatHand::new(hand, bet).settle(Outcome::Blackjack, payoff));
            return Ok(self.finish(player, log));
        }

        if self.rules.surrender && player.accepts_surrender(&hand, upcard)? {
            player.show_card(hole)?;
            let payoff = bet / 2.0;
            player.receive_payoff(payoff);
            log.dealer = dealer;
            log.hands
                .push(SeatHand::new(hand, bet).settle(Outcome::Surrender, payoff));
            return Ok(self.finish(player, log));
        }

        let mut seats = vec![SeatHand::new(hand, bet)];
        if seats[0].hand.is_pair()
            && player.bankrole() >= bet
            && player.accepts_split(&seats[0].hand, upcard)?
        {
            if let Some(face) = seats[0].hand.split_off() {
                player.make_bet(bet);
                let mut second = SeatHand::new(Hand::from(vec![face]), bet);
                let first_card = self.deal_face_up(player)?;
                seats[0].hand.push(first_card);
                second.hand.push(self.deal_face_up(player)?);
                seats.push(second);
                // split aces get one card each
                if face == Face::Ace {
                    seats.iter_mut().for_each(|seat| seat.finished = true);
                }
                log.split = true;
            }
        }

        for seat in seats.iter_mut().filter(|seat| !seat.finished) {
            self.play_hand(player, seat, upcard)?;
        }

        player.show_card(hole)?;
        if seats.iter().any(|seat| !seat.hand.is_bust()) {
            while self.dealer_hits(&dealer) {
                dealer.push(self.deal_face_up(player)?);
            }
        }

        let dealer_value = dealer.value();
        for seat in seats {
            let stake = seat.stake;
            let result = if seat.hand.is_bust() {
                seat.settle(Outcome::Bust, 0.0)
            } else if dealer.is_bust() || seat.hand.value() > dealer_value {
                seat.settle(Outcome::Win, 2.0 * stake)
            } else if seat.hand.value() == dealer_value {
                seat.settle(Outcome::Push, stake)
            } else {
                seat.settle(Outcome::Loss, 0.0)
            };
            if result.payoff > 0.0 {
                player.receive_payoff(result.payoff);
            }
            log.hands.push(result);
        }
        log.dealer = dealer;
        Ok(self.finish(player, log))
    }

    fn play_hand(
        &mut self,
        player: &mut dyn Player,
        seat: &mut SeatHand,
        upcard: Face,
    ) -> Result<(), SimulationError> {
        if seat.hand.len() == 2
            && player.bankrole() >= seat.stake
            && player.accepts_double(&seat.hand, upcard)?
        {
            player.make_bet(seat.stake);
            seat.stake *= 2.0;
            seat.doubled = true;
            seat.hand.push(self.deal_face_up(player)?);
            return Ok(());
        }
        loop {
            if seat.hand.is_bust() || player.accepts_stand(&seat.hand, upcard)? {
                return Ok(());
            }
            seat.hand.push(self.deal_face_up(player)?);
        }
    }

    fn finish(&self, player: &dyn Player, log: RoundLog) -> RoundLog {
        log::debug!(
            "{}: bet {:.2} at true count {:.2}, net {:+.2}, bankrole {:.2}",
            player.label(),
            log.bet,
            log.true_count,
            log.net(),
            player.bankrole()
        );
        log
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use counter_lib::prelude::{parse_faces, BasicPlayer, Counter, CounterError, StrategyConfig};

    /// A player with fixed answers that records every card it is shown.
    struct Scripted {
        insurance: bool,
        surrender: bool,
        split: bool,
        double: bool,
        stand_on: u32,
        bet: f64,
        bankrole: f64,
        seen: Vec<Face>,
        shuffles: u32,
    }

    impl Scripted {
        fn new() -> Self {
            Scripted {
                insurance: false,
                surrender: false,
                split: false,
                double: false,
                stand_on: 17,
                bet: 10.0,
                bankrole: 1000.0,
                seen: Vec::new(),
                shuffles: 0,
            }
        }
    }

    impl Player for Scripted {
        fn label(&self) -> &str {
            "scripted"
        }

        fn accepts_insurance(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
            Ok(self.insurance)
        }

        fn accepts_surrender(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
            Ok(self.surrender)
        }

        fn accepts_split(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
            Ok(self.split)
        }

        fn accepts_double(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
            Ok(self.double)
        }

        fn accepts_stand(&mut self, hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
            Ok(hand.value() >= self.stand_on)
        }

        fn show_card(&mut self, face: Face) -> Result<(), CounterError> {
            self.seen.push(face);
            Ok(())
        }

        fn shuffle(&mut self, _decks_in_shoe: f64) {
            self.shuffles += 1;
        }

        fn bet_amount(&self) -> f64 {
            self.bet
        }

        fn bankrole(&self) -> f64 {
            self.bankrole
        }

        fn set_bankrole(&mut self, amount: f64) {
            self.bankrole = amount;
        }

        fn minimum_bet(&self) -> f64 {
            self.bet
        }
    }

    /// The first face is burned, then player, hole, player, upcard, then every draw in order.
    fn table(faces: &str, rules: TableRules) -> BlackjackTableSim {
        BlackjackTableSim::new(Shoe::stacked(parse_faces(faces).unwrap(), 6), rules)
    }

    #[test]
    fn test_blackjack_pays_three_to_two() {
        let mut player = Scripted::new();
        let log = table("2A9X7", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Blackjack);
        assert_eq!(log.net(), 15.0);
        assert_eq!(player.bankrole, 1015.0);
        // the burn card is never shown, the hole card is shown once revealed
        assert_eq!(player.seen, parse_faces("AX79").unwrap());
        assert_eq!(player.shuffles, 1);
        assert!(log.shuffled);
    }

    #[test]
    fn test_insurance_pays_two_to_one() {
        let mut player = Scripted::new();
        player.insurance = true;
        let log = table("2XX6A", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.insurance, 5.0);
        assert_eq!(log.insurance_payoff, 15.0);
        assert_eq!(log.hands[0].outcome, Outcome::Loss);
        assert_eq!(log.net(), 0.0);
        assert_eq!(player.bankrole, 1000.0);
    }

    #[test]
    fn test_insurance_not_offered_when_disabled() {
        let mut player = Scripted::new();
        player.insurance = true;
        let rules = TableRules {
            insurance: false,
            ..TableRules::default()
        };
        let log = table("2XX6A", rules).play_round(&mut player).unwrap();
        assert_eq!(log.insurance, 0.0);
        assert_eq!(log.net(), -10.0);
        assert_eq!(player.bankrole, 990.0);
    }

    #[test]
    fn test_lost_insurance_when_dealer_has_no_blackjack() {
        let mut player = Scripted::new();
        player.insurance = true;
        // 20 against A7, dealer stands on soft 18
        let log = table("2X7XA", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.insurance, 5.0);
        assert_eq!(log.insurance_payoff, 0.0);
        assert_eq!(log.hands[0].outcome, Outcome::Win);
        assert_eq!(log.net(), 5.0);
        assert_eq!(player.bankrole, 1005.0);
    }

    #[test]
    fn test_ten_up_peek() {
        let mut player = Scripted::new();
        player.split = true;
        let log = table("29A9X", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert!(!log.split);
        assert_eq!(log.hands.len(), 1);
        assert_eq!(log.hands[0].outcome, Outcome::Loss);
        assert_eq!(player.bankrole, 990.0);
        assert_eq!(player.seen, parse_faces("99XA").unwrap());
    }

    #[test]
    fn test_blackjack_against_dealer_blackjack_pushes() {
        let mut player = Scripted::new();
        let log = table("2AAXX", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Push);
        assert_eq!(player.bankrole, 1000.0);
    }

    #[test]
    fn test_late_surrender() {
        let mut player = Scripted::new();
        player.surrender = true;
        let log = table("2X86X", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Surrender);
        assert_eq!(log.net(), -5.0);
        assert_eq!(player.bankrole, 995.0);

        let mut player = Scripted::new();
        player.surrender = true;
        let rules = TableRules {
            surrender: false,
            ..TableRules::default()
        };
        // without surrender 16 stands on 16 against the dealer's 18
        player.stand_on = 16;
        let log = table("2X86X", rules).play_round(&mut player).unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Loss);
    }

    #[test]
    fn test_split_aces_get_one_card() {
        let mut player = Scripted::new();
        player.split = true;
        // never stands, so any extra card would show up in the hands
        player.stand_on = 22;
        let log = table("2A7A6X9X", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert!(log.split);
        assert_eq!(log.hands.len(), 2);
        assert_eq!(log.hands[0].hand.faces(), parse_faces("AX").unwrap().as_slice());
        assert_eq!(log.hands[1].hand.faces(), parse_faces("A9").unwrap().as_slice());
        // a split ace and ten is 21, not a blackjack
        assert_eq!(log.hands[0].outcome, Outcome::Win);
        assert_eq!(log.hands[1].outcome, Outcome::Win);
        assert!(log.dealer.is_bust());
        assert_eq!(log.net(), 20.0);
        assert_eq!(player.bankrole, 1020.0);
    }

    #[test]
    fn test_split_hands_are_played_separately() {
        let mut player = Scripted::new();
        player.split = true;
        // 8 8 against a 6, first hand 8X stands, second 83 hits to 837, dealer X6 draws a 2
        let log = table("28X86X372", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.hands[0].hand.faces(), parse_faces("8X").unwrap().as_slice());
        assert_eq!(log.hands[1].hand.faces(), parse_faces("837").unwrap().as_slice());
        assert_eq!(log.dealer.value(), 18);
        assert!(log.hands.iter().all(|h| h.outcome == Outcome::Push));
        assert_eq!(player.bankrole, 1000.0);
    }

    #[test]
    fn test_double_takes_one_card() {
        let mut player = Scripted::new();
        player.double = true;
        let log = table("25X66X9", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        let result = &log.hands[0];
        assert!(result.doubled);
        assert_eq!(result.stake, 20.0);
        assert_eq!(result.hand.value(), 21);
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(player.bankrole, 1020.0);
    }

    #[test]
    fn test_bust_ends_the_round_without_dealer_draws() {
        let mut player = Scripted::new();
        let log = table("2XX67X", TableRules::default())
            .play_round(&mut player)
            .unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Bust);
        assert_eq!(log.dealer.len(), 2);
        assert_eq!(player.bankrole, 990.0);
    }

    #[test]
    fn test_dealer_soft_seventeen_rule() {
        let stands = TableRules::default();
        let hits = TableRules {
            hit_soft_seventeen: true,
            ..TableRules::default()
        };
        let mut player = Scripted::new();
        let log = table("2X68A4", stands).play_round(&mut player).unwrap();
        assert_eq!(log.dealer.value(), 17);
        assert_eq!(log.hands[0].outcome, Outcome::Win);

        let mut player = Scripted::new();
        let log = table("2X68A4", hits).play_round(&mut player).unwrap();
        assert_eq!(log.dealer.value(), 21);
        assert_eq!(log.hands[0].outcome, Outcome::Loss);
    }

    #[test]
    fn test_stacked_shoe_reshuffles_at_the_cut() {
        let mut player = Scripted::new();
        let mut table = table("2XX67X", TableRules::default());
        table.play_round(&mut player).unwrap();
        let log = table.play_round(&mut player).unwrap();
        assert!(log.shuffled);
        assert_eq!(player.shuffles, 2);
        assert_eq!(player.bankrole, 980.0);
    }

    #[test]
    fn test_bankrole_matches_round_logs() {
        let config = StrategyConfig::default();
        let mut counter = Counter::new(&config);
        counter.set_bankrole(1_000_000.0);
        let shoe = Shoe::new(2, 0.75, Some(11)).unwrap();
        let mut table = BlackjackTableSim::new(shoe, TableRules::default());
        let mut net = 0.0;
        let mut shuffles = 0;
        for _ in 0..500 {
            let log = table.play_round(&mut counter).unwrap();
            net += log.net();
            if log.shuffled {
                shuffles += 1;
            }
        }
        assert!(shuffles > 1);
        assert!((counter.bankrole() - (1_000_000.0 + net)).abs() < 1e-6);

        let mut basic = BasicPlayer::new(&config);
        basic.set_bankrole(1_000_000.0);
        let mut net = 0.0;
        for _ in 0..500 {
            net += table.play_round(&mut basic).unwrap().net();
        }
        assert!((basic.bankrole() - (1_000_000.0 + net)).abs() < 1e-6);
    }

    #[test]
    fn test_shallow_cut_never_runs_the_shoe_dry() {
        let config = StrategyConfig::default();
        for seed in 0..50 {
            let mut counter = Counter::new(&config);
            counter.set_bankrole(1_000_000.0);
            let shoe = Shoe::new(1, 0.05, Some(seed)).unwrap();
            let mut table = BlackjackTableSim::new(shoe, TableRules::default());
            let mut net = 0.0;
            for _ in 0..200 {
                net += table.play_round(&mut counter).unwrap().net();
                assert!(table.shoe().remaining() <= 52);
            }
            assert!((counter.bankrole() - (1_000_000.0 + net)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_dry_shoe_reshuffles_discards_mid_round() {
        let mut player = Scripted::new();
        let mut table = table("2X8X9X7X9", TableRules::default());
        let log = table.play_round(&mut player).unwrap();
        assert_eq!(log.hands[0].outcome, Outcome::Win);
        assert_eq!(player.shuffles, 1);

        // X7X9 is all that is left, the dealer's 16 draws the burned 2 from the discards
        let log = table.play_round(&mut player).unwrap();
        assert!(!log.shuffled);
        assert_eq!(player.shuffles, 2);
        assert_eq!(log.hands[0].hand.value(), 20);
        assert_eq!(log.dealer.value(), 18);
        assert_eq!(log.hands[0].outcome, Outcome::Win);
        assert!(table.shoe().reached_cut());

        let log = table.play_round(&mut player).unwrap();
        assert!(log.shuffled);
        assert_eq!(player.shuffles, 3);
    }

    #[test]
    fn test_rejects_non_positive_bets() {
        let mut player = Scripted::new();
        player.bet = 0.0;
        let result = table("2XX67X", TableRules::default()).play_round(&mut player);
        assert!(matches!(result, Err(SimulationError::Table(_))));
    }
}
