//! Client-side reading of the postseason payload.
//!
//! The server only materializes a playoff bracket once both play-in slots of
//! each conference are settled. Until then the Playoffs tab shows quarterfinal
//! pairings derived from whatever seeds are already known, and every status
//! query below works against a partial payload.
use gm_api::postseason::{
    ConferenceBracket, GameResult, Playoffs, Postseason, SeedEntry, Series,
};
use gm_api::{Conference, RoundKind, team_name};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Standard seeding pairs in bracket order.
pub const QUARTERFINAL_PAIRS: [(u32, u32); 4] = [(1, 8), (4, 5), (3, 6), (2, 7)];

const CONFERENCE_ROUNDS: [RoundKind; 3] =
    [RoundKind::Quarterfinals, RoundKind::Semifinals, RoundKind::ConferenceFinals];

/// Order two entries as `(home, road)`: lower seed first, then better win
/// percentage, then better point differential, then team id.
pub fn pick_home_advantage<'a>(
    a: &'a SeedEntry,
    b: &'a SeedEntry,
) -> (&'a SeedEntry, &'a SeedEntry) {
    if let (Some(sa), Some(sb)) = (a.seed, b.seed) {
        if sa != sb {
            return if sa < sb { (a, b) } else { (b, a) };
        }
    }
    let by_f64 = |x: Option<f64>, y: Option<f64>| {
        x.unwrap_or(0.0)
            .partial_cmp(&y.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    };
    match by_f64(a.win_pct, b.win_pct).then(by_f64(a.point_diff, b.point_diff)) {
        Ordering::Greater => (a, b),
        Ordering::Less => (b, a),
        Ordering::Equal if a.team_id < b.team_id => (a, b),
        Ordering::Equal => (b, a),
    }
}

/// Seeds 1..=8 known so far for a conference.
///
/// The server's playoff seeds win when present. Otherwise auto bids fill
/// slots one through six and decided play-in winners fill seven and eight.
pub fn resolved_seeds(ps: &Postseason, conference: Conference) -> BTreeMap<u32, SeedEntry> {
    if let Some(playoffs) = &ps.playoffs {
        let seeds: BTreeMap<u32, SeedEntry> = playoffs
            .seeds
            .conference(conference)
            .iter()
            .filter_map(|(k, v)| Some((k.trim().parse().ok()?, v.clone())))
            .collect();
        if !seeds.is_empty() {
            return seeds;
        }
    }

    let mut seeds = BTreeMap::new();
    if let Some(field) = ps.field.as_ref().and_then(|f| f.conference(conference)) {
        for entry in &field.auto_bids {
            if let Some(seed) = entry.seed.filter(|s| (1..=6).contains(s)) {
                seeds.insert(seed, entry.clone());
            }
        }
    }
    if let Some(play_in) = ps.play_in.as_ref().and_then(|p| p.conference(conference)) {
        if let Some(entry) = &play_in.seed7 {
            seeds.insert(7, entry.clone());
        }
        if let Some(entry) = &play_in.seed8 {
            seeds.insert(8, entry.clone());
        }
    }
    seeds
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub high_seed: u32,
    pub low_seed: u32,
    /// `(home, road)` once both slots are filled.
    pub teams: Option<(SeedEntry, SeedEntry)>,
}

impl Pairing {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.high_seed, self.low_seed)
    }

    pub fn is_ready(&self) -> bool {
        self.teams.is_some()
    }
}

/// Quarterfinal pairings from known seeds. A pairing only forms when both of
/// its seeds are resolved.
pub fn derive_quarterfinals(seeds: &BTreeMap<u32, SeedEntry>) -> Vec<Pairing> {
    QUARTERFINAL_PAIRS
        .iter()
        .map(|&(high, low)| {
            let teams = match (seeds.get(&high), seeds.get(&low)) {
                (Some(a), Some(b)) => {
                    let (home, road) = pick_home_advantage(a, b);
                    Some((home.clone(), road.clone()))
                }
                _ => None,
            };
            Pairing { high_seed: high, low_seed: low, teams }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConferenceView<'a> {
    /// The server's bracket, used as soon as it has quarterfinals.
    Materialized(&'a ConferenceBracket),
    Derived(Vec<Pairing>),
    NotGenerated,
}

pub fn conference_view(ps: &Postseason, conference: Conference) -> ConferenceView<'_> {
    if let Some(playoffs) = &ps.playoffs {
        let bracket = playoffs.bracket.conference(conference);
        if !bracket.quarterfinals.is_empty() {
            return ConferenceView::Materialized(bracket);
        }
    }
    let seeds = resolved_seeds(ps, conference);
    if seeds.is_empty() {
        ConferenceView::NotGenerated
    } else {
        ConferenceView::Derived(derive_quarterfinals(&seeds))
    }
}

pub fn round_label(ps: &Postseason) -> String {
    if let Some(champion) = &ps.champion {
        return format!("Champion: {}", team_name(&champion.team_id));
    }
    if let Some(playoffs) = &ps.playoffs {
        return playoffs
            .current_round
            .clone()
            .unwrap_or_else(|| playoffs.current_round_kind().label().to_string());
    }
    if ps.play_in.is_some() {
        return "Play-In Tournament".to_string();
    }
    if ps.field.is_some() {
        return "Seeding".to_string();
    }
    "Not started".to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TeamStatus {
    Champion,
    Active { round: RoundKind, wins: u32, losses: u32, opponent: String },
    /// Won a series and waits for the next round to be drawn.
    Advanced { round: RoundKind },
    Eliminated { stage: String },
    /// Holds a playoff seed but the bracket has not been drawn.
    Qualified { seed: u32 },
    InPlayIn,
    MissedPostseason,
    NotInField,
}

impl TeamStatus {
    pub fn describe(&self) -> String {
        match self {
            TeamStatus::Champion => "Champions!".to_string(),
            TeamStatus::Active { round, wins, losses, opponent } => format!(
                "{}: {wins}-{losses} vs {}",
                round.label(),
                team_name(opponent)
            ),
            TeamStatus::Advanced { round } => {
                format!("Won the {}, waiting for the next round", round.label())
            }
            TeamStatus::Eliminated { stage } => format!("Eliminated in the {stage}"),
            TeamStatus::Qualified { seed } => format!("Qualified as the {seed} seed"),
            TeamStatus::InPlayIn => "Alive in the play-in".to_string(),
            TeamStatus::MissedPostseason => "Missed the postseason".to_string(),
            TeamStatus::NotInField => "No postseason data".to_string(),
        }
    }
}

/// Every series in the bracket tagged with its round, earliest round first.
fn series_by_round(playoffs: &Playoffs) -> Vec<(RoundKind, &Series)> {
    let mut out = Vec::new();
    for round in CONFERENCE_ROUNDS {
        for conference in Conference::all() {
            for series in playoffs.bracket.conference(conference).round(round) {
                out.push((round, series));
            }
        }
    }
    if let Some(finals) = &playoffs.bracket.finals {
        out.push((RoundKind::Finals, finals));
    }
    out
}

pub fn team_status(ps: &Postseason, team_id: &str) -> TeamStatus {
    if ps.champion.as_ref().is_some_and(|c| c.team_id == team_id) {
        return TeamStatus::Champion;
    }

    if let Some(playoffs) = &ps.playoffs {
        let mine: Vec<_> = series_by_round(playoffs)
            .into_iter()
            .filter(|(_, s)| s.involves(team_id))
            .collect();
        if let Some((round, _)) = mine.iter().find(|(_, s)| s.loser_id() == Some(team_id)) {
            return TeamStatus::Eliminated { stage: round.label().to_string() };
        }
        if let Some((round, series)) = mine.iter().find(|(_, s)| !s.is_finished()) {
            let opponent = if series.home_court == team_id { &series.road } else { &series.home_court };
            return TeamStatus::Active {
                round: *round,
                wins: series.wins_for(team_id),
                losses: series.wins_for(opponent),
                opponent: opponent.clone(),
            };
        }
        if let Some((round, _)) = mine.last() {
            if *round == RoundKind::Finals {
                return TeamStatus::Champion;
            }
            return TeamStatus::Advanced { round: *round };
        }
        for conference in Conference::all() {
            if let Some((seed, _)) = resolved_seeds(ps, conference)
                .into_iter()
                .find(|(_, e)| e.team_id == team_id)
            {
                return TeamStatus::Qualified { seed };
            }
        }
    }

    if let Some(play_in) = &ps.play_in {
        for conference in Conference::all() {
            let Some(conf) = play_in.conference(conference) else { continue };
            if conf.eliminated.iter().any(|id| id == team_id) {
                return TeamStatus::Eliminated { stage: "Play-In Tournament".to_string() };
            }
            if conf.seed7.as_ref().is_some_and(|e| e.team_id == team_id) {
                return TeamStatus::Qualified { seed: 7 };
            }
            if conf.seed8.as_ref().is_some_and(|e| e.team_id == team_id) {
                return TeamStatus::Qualified { seed: 8 };
            }
            if conf.has_participant(team_id) {
                if conf.is_decided() {
                    return TeamStatus::Eliminated { stage: "Play-In Tournament".to_string() };
                }
                return TeamStatus::InPlayIn;
            }
        }
    }

    if let Some(field) = &ps.field {
        for conference in Conference::all() {
            let Some(conf) = field.conference(conference) else { continue };
            if let Some(entry) = conf.auto_bids.iter().find(|e| e.team_id == team_id) {
                return TeamStatus::Qualified { seed: entry.seed.unwrap_or(0) };
            }
            if conf.play_in.iter().any(|e| e.team_id == team_id) {
                return TeamStatus::InPlayIn;
            }
            if conf.eliminated.iter().any(|e| e.team_id == team_id) {
                return TeamStatus::MissedPostseason;
            }
        }
    }

    TeamStatus::NotInField
}

/// The unfinished series of the current round that contains the team.
pub fn find_my_series<'a>(playoffs: &'a Playoffs, team_id: &str) -> Option<&'a Series> {
    playoffs
        .bracket
        .round(playoffs.current_round_kind())
        .into_iter()
        .find(|s| s.involves(team_id) && !s.is_finished())
}

pub fn series_label(series: &Series, my_team_id: Option<&str>) -> String {
    let label = format!(
        "{} {} - {} {}",
        team_name(&series.home_court),
        series.wins_for(&series.home_court),
        series.wins_for(&series.road),
        team_name(&series.road)
    );
    match my_team_id {
        Some(me) if series.involves(me) => format!("{label} (my series)"),
        _ => label,
    }
}

pub fn game_line(game: &GameResult) -> String {
    let score = |s: Option<u32>| s.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
    format!(
        "{}: {} {} - {} {}",
        game.date.as_deref().unwrap_or("-"),
        team_name(&game.home_team_id),
        score(game.home_score),
        score(game.away_score),
        team_name(&game.away_team_id)
    )
}

/// Every finished postseason game the team played, newest first.
pub fn game_log<'a>(ps: &'a Postseason, team_id: &str) -> Vec<&'a GameResult> {
    let mut games: Vec<&GameResult> = Vec::new();
    if let Some(play_in) = &ps.play_in {
        for conference in Conference::all() {
            let Some(conf) = play_in.conference(conference) else { continue };
            games.extend(
                conf.matchups
                    .iter()
                    .filter_map(|(_, m)| m.result.as_ref())
                    .filter(|g| g.involves(team_id)),
            );
        }
    }
    if let Some(playoffs) = &ps.playoffs {
        for (_, series) in series_by_round(playoffs) {
            games.extend(series.games.iter().filter(|g| g.involves(team_id)));
        }
    }
    games.reverse();
    games
}

/// The play-in game the team still has to play, with its matchup label.
pub fn pending_play_in_game<'a>(
    ps: &'a Postseason,
    team_id: &str,
) -> Option<(&'static str, &'a gm_api::postseason::PlayInMatchup)> {
    let play_in = ps.play_in.as_ref()?;
    Conference::all().into_iter().find_map(|conference| {
        play_in
            .conference(conference)?
            .matchups
            .iter()
            .find(|(_, m)| m.is_ready() && m.result.is_none() && m.involves(team_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_api::postseason::{
        ConferenceField, Field, PlayIn, PlayInConference, PlayInMatchup, PlayoffSeeds,
    };

    fn entry(team: &str, seed: u32) -> SeedEntry {
        SeedEntry {
            team_id: team.into(),
            seed: Some(seed),
            win_pct: Some(0.7 - seed as f64 * 0.02),
            ..Default::default()
        }
    }

    fn east_teams() -> [&'static str; 10] {
        ["BOS", "MIL", "PHI", "CLE", "NYK", "MIA", "IND", "ORL", "CHI", "ATL"]
    }

    fn field_only() -> Postseason {
        let teams = east_teams();
        let auto_bids = (0..6).map(|i| entry(teams[i], i as u32 + 1)).collect();
        let play_in = (6..10).map(|i| entry(teams[i], i as u32 + 1)).collect();
        Postseason {
            field: Some(Field {
                east: Some(ConferenceField {
                    auto_bids,
                    play_in,
                    eliminated: vec![entry("WAS", 15)],
                }),
                west: None,
            }),
            my_team_id: Some("MIA".into()),
            ..Default::default()
        }
    }

    fn series(home: &str, road: &str, hw: u32, rw: u32, round: RoundKind) -> Series {
        let mut wins = BTreeMap::new();
        wins.insert(home.to_string(), hw);
        wins.insert(road.to_string(), rw);
        Series {
            round: Some(round.label().into()),
            home_court: home.into(),
            road: road.into(),
            wins,
            ..Default::default()
        }
    }

    #[test]
    fn home_advantage_prefers_lower_seed_then_record() {
        let a = entry("BOS", 1);
        let b = entry("MIA", 8);
        assert_eq!(pick_home_advantage(&b, &a).0.team_id, "BOS");

        let mut c = SeedEntry { team_id: "DEN".into(), win_pct: Some(0.6), ..Default::default() };
        let mut d = SeedEntry { team_id: "LAL".into(), win_pct: Some(0.7), ..Default::default() };
        assert_eq!(pick_home_advantage(&c, &d).0.team_id, "LAL");

        d.win_pct = Some(0.6);
        c.point_diff = Some(40.0);
        d.point_diff = Some(10.0);
        assert_eq!(pick_home_advantage(&d, &c).0.team_id, "DEN");

        c.point_diff = d.point_diff;
        assert_eq!(pick_home_advantage(&d, &c).0.team_id, "DEN");
    }

    #[test]
    fn pairings_only_form_when_both_seeds_are_known() {
        let ps = field_only();
        let seeds = resolved_seeds(&ps, Conference::East);
        assert_eq!(seeds.len(), 6);
        let pairs = derive_quarterfinals(&seeds);
        let labels: Vec<String> = pairs.iter().map(Pairing::label).collect();
        assert_eq!(labels, ["1 vs 8", "4 vs 5", "3 vs 6", "2 vs 7"]);
        assert!(!pairs[0].is_ready());
        assert!(pairs[1].is_ready());
        assert!(pairs[2].is_ready());
        assert!(!pairs[3].is_ready());

        let (home, road) = pairs[1].teams.clone().expect("4 vs 5 ready");
        assert_eq!(home.team_id, "CLE");
        assert_eq!(road.team_id, "NYK");
    }

    #[test]
    fn decided_play_in_fills_slots_seven_and_eight() {
        let mut ps = field_only();
        ps.play_in = Some(PlayIn {
            east: Some(PlayInConference {
                seed7: Some(entry("ORL", 8)),
                seed8: Some(entry("CHI", 9)),
                ..Default::default()
            }),
            west: None,
        });
        let seeds = resolved_seeds(&ps, Conference::East);
        assert_eq!(seeds.get(&7).map(|e| e.team_id.as_str()), Some("ORL"));
        assert_eq!(seeds.get(&8).map(|e| e.team_id.as_str()), Some("CHI"));
        assert!(derive_quarterfinals(&seeds).iter().all(Pairing::is_ready));
    }

    #[test]
    fn materialized_bracket_wins_over_derivation() {
        let mut ps = field_only();
        assert!(matches!(conference_view(&ps, Conference::East), ConferenceView::Derived(_)));
        assert_eq!(conference_view(&ps, Conference::West), ConferenceView::NotGenerated);

        let mut playoffs = Playoffs::default();
        playoffs
            .bracket
            .east
            .quarterfinals
            .push(series("BOS", "ORL", 0, 0, RoundKind::Quarterfinals));
        ps.playoffs = Some(playoffs);
        assert!(matches!(
            conference_view(&ps, Conference::East),
            ConferenceView::Materialized(b) if b.quarterfinals.len() == 1
        ));
    }

    #[test]
    fn server_seeds_take_precedence() {
        let mut ps = field_only();
        let mut seeds = PlayoffSeeds::default();
        seeds.east.insert("1".into(), entry("NYK", 1));
        ps.playoffs = Some(Playoffs { seeds, ..Default::default() });
        let resolved = resolved_seeds(&ps, Conference::East);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[&1].team_id, "NYK");
    }

    #[test]
    fn round_label_follows_progress() {
        assert_eq!(round_label(&Postseason::default()), "Not started");
        let mut ps = field_only();
        assert_eq!(round_label(&ps), "Seeding");
        ps.play_in = Some(PlayIn::default());
        assert_eq!(round_label(&ps), "Play-In Tournament");
        ps.playoffs = Some(Playoffs {
            current_round: Some("Conference Semifinals".into()),
            ..Default::default()
        });
        assert_eq!(round_label(&ps), "Conference Semifinals");
        ps.champion = Some(entry("BOS", 1));
        assert_eq!(round_label(&ps), "Champion: Boston Celtics");
    }

    #[test]
    fn status_from_field_and_play_in() {
        let mut ps = field_only();
        assert_eq!(team_status(&ps, "MIA"), TeamStatus::Qualified { seed: 6 });
        assert_eq!(team_status(&ps, "ATL"), TeamStatus::InPlayIn);
        assert_eq!(team_status(&ps, "WAS"), TeamStatus::MissedPostseason);
        assert_eq!(team_status(&ps, "DEN"), TeamStatus::NotInField);

        let mut participants = BTreeMap::new();
        for (i, t) in ["IND", "ORL", "CHI", "ATL"].iter().enumerate() {
            participants.insert((i + 7).to_string(), entry(t, i as u32 + 7));
        }
        ps.play_in = Some(PlayIn {
            east: Some(PlayInConference {
                participants,
                seed7: Some(entry("IND", 7)),
                eliminated: vec!["ATL".into()],
                ..Default::default()
            }),
            west: None,
        });
        assert_eq!(team_status(&ps, "IND"), TeamStatus::Qualified { seed: 7 });
        assert_eq!(
            team_status(&ps, "ATL"),
            TeamStatus::Eliminated { stage: "Play-In Tournament".into() }
        );
        assert_eq!(team_status(&ps, "ORL"), TeamStatus::InPlayIn);
    }

    #[test]
    fn status_scans_bracket() {
        let mut playoffs = Playoffs {
            current_round: Some(RoundKind::Semifinals.label().into()),
            ..Default::default()
        };
        let east = &mut playoffs.bracket.east;
        east.quarterfinals.push(series("BOS", "ORL", 4, 1, RoundKind::Quarterfinals));
        east.quarterfinals.push(series("CLE", "NYK", 2, 4, RoundKind::Quarterfinals));
        east.quarterfinals.push(series("PHI", "MIA", 4, 3, RoundKind::Quarterfinals));
        east.semifinals.push(series("BOS", "NYK", 1, 2, RoundKind::Semifinals));
        let ps = Postseason { playoffs: Some(playoffs), ..Default::default() };

        assert_eq!(
            team_status(&ps, "NYK"),
            TeamStatus::Active {
                round: RoundKind::Semifinals,
                wins: 2,
                losses: 1,
                opponent: "BOS".into()
            }
        );
        assert_eq!(
            team_status(&ps, "CLE"),
            TeamStatus::Eliminated { stage: "Conference Quarterfinals".into() }
        );
        assert_eq!(
            team_status(&ps, "PHI"),
            TeamStatus::Advanced { round: RoundKind::Quarterfinals }
        );

        let playoffs = ps.playoffs.as_ref().expect("playoffs");
        let mine = find_my_series(playoffs, "NYK").expect("nyk in semis");
        assert_eq!(
            series_label(mine, Some("NYK")),
            "Boston Celtics 1 - 2 New York Knicks (my series)"
        );
        assert_eq!(series_label(mine, Some("MIA")), "Boston Celtics 1 - 2 New York Knicks");
        assert!(find_my_series(playoffs, "PHI").is_none());
    }

    #[test]
    fn champion_status() {
        let ps = Postseason { champion: Some(entry("DEN", 1)), ..Default::default() };
        assert_eq!(team_status(&ps, "DEN"), TeamStatus::Champion);
        assert_eq!(TeamStatus::Champion.describe(), "Champions!");
    }

    #[test]
    fn game_log_is_newest_first_across_stages() {
        let game = |home: &str, away: &str, date: &str| GameResult {
            home_team_id: home.into(),
            away_team_id: away.into(),
            home_score: Some(100),
            away_score: Some(95),
            winner: Some(home.into()),
            date: Some(date.into()),
        };
        let mut conf = PlayInConference::default();
        conf.matchups.seven_vs_eight = PlayInMatchup {
            home: Some(entry("IND", 7)),
            away: Some(entry("ORL", 8)),
            result: Some(game("IND", "ORL", "2026-04-14")),
        };
        let mut playoffs = Playoffs::default();
        let mut qf = series("BOS", "IND", 1, 0, RoundKind::Quarterfinals);
        qf.games.push(game("BOS", "IND", "2026-04-19"));
        playoffs.bracket.east.quarterfinals.push(qf);
        let ps = Postseason {
            play_in: Some(PlayIn { east: Some(conf), west: None }),
            playoffs: Some(playoffs),
            ..Default::default()
        };

        let log = game_log(&ps, "IND");
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].date.as_deref(), Some("2026-04-19"));
        assert_eq!(
            game_line(log[1]),
            "2026-04-14: Indiana Pacers 100 - 95 Orlando Magic"
        );
    }

    #[test]
    fn pending_play_in_requires_both_sides_and_no_result() {
        let mut conf = PlayInConference::default();
        conf.matchups.nine_vs_ten = PlayInMatchup {
            home: Some(entry("CHI", 9)),
            away: Some(entry("ATL", 10)),
            result: None,
        };
        conf.matchups.decider = PlayInMatchup {
            home: Some(entry("ORL", 8)),
            away: None,
            result: None,
        };
        let ps = Postseason {
            play_in: Some(PlayIn { east: Some(conf), west: None }),
            ..Default::default()
        };
        assert_eq!(pending_play_in_game(&ps, "ATL").map(|(l, _)| l), Some("9 vs 10"));
        assert!(pending_play_in_game(&ps, "ORL").is_none());
    }
}
