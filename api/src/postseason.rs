//! Postseason payload returned by every `/api/postseason/*` endpoint.
//!
//! The server builds this structure incrementally: `field` exists once seeding
//! is done, `play_in` once the play-in is prepared, `playoffs` only after both
//! play-in slots of each conference are decided. Every level is optional and
//! defaults to empty so a partially built payload always deserializes.
use crate::{Conference, RoundKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedEntry {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
    #[serde(default)]
    pub win_pct: Option<f64>,
    #[serde(default)]
    pub point_diff: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConferenceField {
    #[serde(default)]
    pub auto_bids: Vec<SeedEntry>,
    #[serde(default)]
    pub play_in: Vec<SeedEntry>,
    #[serde(default)]
    pub eliminated: Vec<SeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub east: Option<ConferenceField>,
    #[serde(default)]
    pub west: Option<ConferenceField>,
}

impl Field {
    pub fn conference(&self, conference: Conference) -> Option<&ConferenceField> {
        match conference {
            Conference::East => self.east.as_ref(),
            Conference::West => self.west.as_ref(),
        }
    }
}

/// One finished postseason game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    #[serde(default)]
    pub home_team_id: String,
    #[serde(default)]
    pub away_team_id: String,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl GameResult {
    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayInMatchup {
    #[serde(default)]
    pub home: Option<SeedEntry>,
    #[serde(default)]
    pub away: Option<SeedEntry>,
    #[serde(default)]
    pub result: Option<GameResult>,
}

impl PlayInMatchup {
    pub fn involves(&self, team_id: &str) -> bool {
        [&self.home, &self.away]
            .into_iter()
            .flatten()
            .any(|e| e.team_id == team_id)
    }

    pub fn is_ready(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayInMatchups {
    #[serde(default)]
    pub seven_vs_eight: PlayInMatchup,
    #[serde(default)]
    pub nine_vs_ten: PlayInMatchup,
    #[serde(default, rename = "final")]
    pub decider: PlayInMatchup,
}

impl PlayInMatchups {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PlayInMatchup)> {
        [
            ("7 vs 8", &self.seven_vs_eight),
            ("9 vs 10", &self.nine_vs_ten),
            ("Final", &self.decider),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayInConference {
    #[serde(default)]
    pub conference: Option<String>,
    /// Keyed by seed number as a string ("7".."10").
    #[serde(default)]
    pub participants: BTreeMap<String, SeedEntry>,
    #[serde(default)]
    pub matchups: PlayInMatchups,
    #[serde(default)]
    pub seed7: Option<SeedEntry>,
    #[serde(default)]
    pub seed8: Option<SeedEntry>,
    #[serde(default)]
    pub eliminated: Vec<String>,
}

impl PlayInConference {
    pub fn is_decided(&self) -> bool {
        self.seed7.is_some() && self.seed8.is_some()
    }

    pub fn has_participant(&self, team_id: &str) -> bool {
        self.participants.values().any(|e| e.team_id == team_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayIn {
    #[serde(default)]
    pub east: Option<PlayInConference>,
    #[serde(default)]
    pub west: Option<PlayInConference>,
}

impl PlayIn {
    pub fn conference(&self, conference: Conference) -> Option<&PlayInConference> {
        match conference {
            Conference::East => self.east.as_ref(),
            Conference::West => self.west.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub round: Option<String>,
    /// "1 vs 8", "SF1", "CF", "FINALS".
    #[serde(default)]
    pub matchup: String,
    #[serde(default)]
    pub home_court: String,
    #[serde(default)]
    pub road: String,
    #[serde(default)]
    pub home_entry: Option<SeedEntry>,
    #[serde(default)]
    pub road_entry: Option<SeedEntry>,
    #[serde(default)]
    pub games: Vec<GameResult>,
    #[serde(default)]
    pub wins: BTreeMap<String, u32>,
    #[serde(default = "default_best_of")]
    pub best_of: u32,
    #[serde(default)]
    pub winner: Option<SeedEntry>,
}

fn default_best_of() -> u32 {
    7
}

impl Default for Series {
    fn default() -> Self {
        Self {
            round: None,
            matchup: String::new(),
            home_court: String::new(),
            road: String::new(),
            home_entry: None,
            road_entry: None,
            games: Vec::new(),
            wins: BTreeMap::new(),
            best_of: default_best_of(),
            winner: None,
        }
    }
}

impl Series {
    pub fn wins_for(&self, team_id: &str) -> u32 {
        self.wins.get(team_id).copied().unwrap_or(0)
    }

    pub fn wins_needed(&self) -> u32 {
        self.best_of / 2 + 1
    }

    /// A series ends when a winner is recorded or either side reaches the
    /// majority of `best_of`.
    pub fn is_finished(&self) -> bool {
        self.winner.is_some() || self.wins.values().any(|w| *w >= self.wins_needed())
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_court == team_id || self.road == team_id
    }

    pub fn winner_id(&self) -> Option<&str> {
        if let Some(w) = &self.winner {
            return Some(w.team_id.as_str());
        }
        let needed = self.wins_needed();
        [&self.home_court, &self.road]
            .into_iter()
            .find(|id| self.wins_for(id) >= needed)
            .map(String::as_str)
    }

    pub fn loser_id(&self) -> Option<&str> {
        let winner = self.winner_id()?;
        if winner == self.home_court {
            Some(&self.road)
        } else {
            Some(&self.home_court)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConferenceBracket {
    #[serde(default)]
    pub quarterfinals: Vec<Series>,
    #[serde(default)]
    pub semifinals: Vec<Series>,
    #[serde(default)]
    pub finals: Option<Series>,
}

impl ConferenceBracket {
    pub fn round(&self, round: RoundKind) -> Vec<&Series> {
        match round {
            RoundKind::Quarterfinals => self.quarterfinals.iter().collect(),
            RoundKind::Semifinals => self.semifinals.iter().collect(),
            RoundKind::ConferenceFinals => self.finals.iter().collect(),
            RoundKind::Finals => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(default)]
    pub east: ConferenceBracket,
    #[serde(default)]
    pub west: ConferenceBracket,
    #[serde(default)]
    pub finals: Option<Series>,
}

impl Bracket {
    pub fn conference(&self, conference: Conference) -> &ConferenceBracket {
        match conference {
            Conference::East => &self.east,
            Conference::West => &self.west,
        }
    }

    /// Every series of a round across both conferences.
    pub fn round(&self, round: RoundKind) -> Vec<&Series> {
        match round {
            RoundKind::Finals => self.finals.iter().collect(),
            _ => {
                let mut out = self.east.round(round);
                out.extend(self.west.round(round));
                out
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoffSeeds {
    /// Seed number as string key ("1".."8").
    #[serde(default)]
    pub east: BTreeMap<String, SeedEntry>,
    #[serde(default)]
    pub west: BTreeMap<String, SeedEntry>,
}

impl PlayoffSeeds {
    pub fn conference(&self, conference: Conference) -> &BTreeMap<String, SeedEntry> {
        match conference {
            Conference::East => &self.east,
            Conference::West => &self.west,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playoffs {
    #[serde(default)]
    pub seeds: PlayoffSeeds,
    #[serde(default)]
    pub bracket: Bracket,
    #[serde(default)]
    pub current_round: Option<String>,
}

impl Playoffs {
    pub fn current_round_kind(&self) -> RoundKind {
        self.current_round
            .as_deref()
            .and_then(RoundKind::from_label)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postseason {
    #[serde(default)]
    pub field: Option<Field>,
    #[serde(default)]
    pub play_in: Option<PlayIn>,
    #[serde(default)]
    pub playoffs: Option<Playoffs>,
    #[serde(default)]
    pub champion: Option<SeedEntry>,
    #[serde(default)]
    pub my_team_id: Option<String>,
}

impl Postseason {
    pub fn is_started(&self) -> bool {
        self.field.is_some() || self.play_in.is_some() || self.playoffs.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(home: &str, road: &str, home_wins: u32, road_wins: u32) -> Series {
        let mut wins = BTreeMap::new();
        wins.insert(home.to_string(), home_wins);
        wins.insert(road.to_string(), road_wins);
        Series {
            matchup: "1 vs 8".into(),
            home_court: home.into(),
            road: road.into(),
            wins,
            ..Default::default()
        }
    }

    #[test]
    fn series_finishes_at_four_wins() {
        let s = series("BOS", "MIA", 3, 3);
        assert!(!s.is_finished());
        assert_eq!(s.winner_id(), None);

        let s = series("BOS", "MIA", 4, 2);
        assert!(s.is_finished());
        assert_eq!(s.winner_id(), Some("BOS"));
        assert_eq!(s.loser_id(), Some("MIA"));
    }

    #[test]
    fn explicit_winner_entry_wins_over_tally() {
        let mut s = series("BOS", "MIA", 0, 0);
        s.winner = Some(SeedEntry { team_id: "MIA".into(), ..Default::default() });
        assert!(s.is_finished());
        assert_eq!(s.winner_id(), Some("MIA"));
    }

    #[test]
    fn partial_payload_deserializes() {
        let json = r#"{
            "field": {"east": {"auto_bids": [{"team_id": "BOS", "seed": 1}], "play_in": [], "eliminated": []}, "west": null},
            "play_in": null,
            "playoffs": null,
            "champion": null,
            "my_team_id": "BOS"
        }"#;
        let ps: Postseason = serde_json::from_str(json).expect("postseason should parse");
        assert!(ps.is_started());
        let east = ps.field.as_ref().and_then(|f| f.conference(Conference::East));
        assert_eq!(east.map(|c| c.auto_bids.len()), Some(1));
        assert!(ps.playoffs.is_none());
    }

    #[test]
    fn play_in_final_matchup_uses_reserved_key() {
        let json = r#"{
            "conference": "east",
            "participants": {"7": {"team_id": "ATL", "seed": 7}},
            "matchups": {
                "seven_vs_eight": {"home": {"team_id": "ATL", "seed": 7}, "away": {"team_id": "CHI", "seed": 8}, "result": null},
                "nine_vs_ten": {"home": null, "away": null, "result": null},
                "final": {"home": {"team_id": "CHI", "seed": 8}, "away": null, "result": null}
            },
            "seed7": null,
            "seed8": null,
            "eliminated": []
        }"#;
        let conf: PlayInConference = serde_json::from_str(json).expect("play-in should parse");
        assert!(conf.matchups.decider.involves("CHI"));
        assert!(!conf.matchups.decider.is_ready());
        assert!(conf.has_participant("ATL"));
        assert!(!conf.is_decided());
    }

    #[test]
    fn bracket_round_spans_both_conferences() {
        let mut bracket = Bracket::default();
        bracket.east.quarterfinals.push(series("BOS", "MIA", 0, 0));
        bracket.west.quarterfinals.push(series("DEN", "LAL", 0, 0));
        assert_eq!(bracket.round(RoundKind::Quarterfinals).len(), 2);
        assert!(bracket.round(RoundKind::Finals).is_empty());
    }
}
