use gm_api::{PlayerId, Roster};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_STARTERS: usize = 5;
pub const MIN_ROTATION: u8 = 6;
pub const MAX_ROTATION: u8 = 10;
pub const DEFAULT_ROTATION: u8 = 9;
pub const MAX_MINUTES: f64 = 48.0;
pub const MINUTES_STEP: f64 = 0.5;
/// Five positions times 48 minutes.
pub const TEAM_MINUTES_TARGET: f64 = 240.0;
pub const SCHEME_WEIGHT_TOTAL: u8 = 10;
pub const MAX_SECONDARY_WEIGHT: u8 = 5;
pub const PACE_RANGE: (i8, i8) = (-2, 2);

// ---------------------------------------------------------------------------
// Schemes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffenseScheme {
    PaceSpace,
    Motion,
    PostUp,
    PickAndRoll,
    IsoHeavy,
}

impl OffenseScheme {
    const ALL: [OffenseScheme; 5] = [
        OffenseScheme::PaceSpace,
        OffenseScheme::Motion,
        OffenseScheme::PostUp,
        OffenseScheme::PickAndRoll,
        OffenseScheme::IsoHeavy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OffenseScheme::PaceSpace => "Pace & space",
            OffenseScheme::Motion => "Motion",
            OffenseScheme::PostUp => "Post-up",
            OffenseScheme::PickAndRoll => "Pick & roll",
            OffenseScheme::IsoHeavy => "Iso heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseScheme {
    DropCoverage,
    SwitchEverything,
    Zone,
    Hedge,
    Ice,
}

impl DefenseScheme {
    const ALL: [DefenseScheme; 5] = [
        DefenseScheme::DropCoverage,
        DefenseScheme::SwitchEverything,
        DefenseScheme::Zone,
        DefenseScheme::Hedge,
        DefenseScheme::Ice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DefenseScheme::DropCoverage => "Drop coverage",
            DefenseScheme::SwitchEverything => "Switch everything",
            DefenseScheme::Zone => "Zone",
            DefenseScheme::Hedge => "Hedge",
            DefenseScheme::Ice => "Ice",
        }
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let idx = all.iter().position(|s| *s == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}

/// `None` sits after the last scheme in the cycle.
fn cycle_optional<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(s) => {
            let idx = all.iter().position(|x| *x == s).unwrap_or(0);
            all.get(idx + 1).copied()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Offense,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Starter,
    Bench,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Starter => "Starter",
            Role::Bench => "Bench",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineupError {
    StartersFull,
    RotationFull { rotation_size: u8 },
    NotInRotation,
}

impl fmt::Display for LineupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineupError::StartersFull => {
                write!(f, "You can name at most {MAX_STARTERS} starters.")
            }
            LineupError::RotationFull { rotation_size } => {
                write!(f, "The rotation is limited to {rotation_size} players.")
            }
            LineupError::NotInRotation => {
                write!(f, "Only starters and bench players get minutes.")
            }
        }
    }
}

/// Default minutes by role for a given rotation size.
pub fn default_minutes(role: Role, rotation_size: u8) -> f64 {
    let (starter, bench) = match rotation_size {
        6 => (41.0, 35.0),
        7 => (36.0, 30.0),
        8 => (33.0, 25.0),
        9 => (28.0, 25.0),
        10 => (25.0, 23.0),
        _ => (32.0, 22.0),
    };
    match role {
        Role::Starter => starter,
        Role::Bench => bench,
    }
}

pub fn pace_label(pace: i8) -> &'static str {
    match pace {
        i8::MIN..=-2 => "Very slow",
        -1 => "Slow",
        0 => "Normal",
        1 => "Fast",
        _ => "Very fast",
    }
}

fn snap_minutes(minutes: f64) -> f64 {
    let clamped = if minutes.is_finite() { minutes.clamp(0.0, MAX_MINUTES) } else { 0.0 };
    (clamped / MINUTES_STEP).round() * MINUTES_STEP
}

// ---------------------------------------------------------------------------
// Tactics
// ---------------------------------------------------------------------------

/// Per-team game plan. Field names serialize in the camelCase form the
/// simulation engine reads.
///
/// Invariants kept by every mutator:
/// starters never exceed five; starters plus bench never exceed the rotation
/// size; each primary/secondary weight pair sums to ten with the secondary in
/// `0..=5`; minutes exist only for rotation players and stay within `0..=48`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tactics {
    pace: i8,
    offense_scheme: OffenseScheme,
    offense_secondary_scheme: Option<OffenseScheme>,
    offense_primary_weight: u8,
    offense_secondary_weight: u8,
    defense_scheme: DefenseScheme,
    defense_secondary_scheme: Option<DefenseScheme>,
    defense_primary_weight: u8,
    defense_secondary_weight: u8,
    rotation_size: u8,
    starters: Vec<PlayerId>,
    bench: Vec<PlayerId>,
    minutes: BTreeMap<PlayerId, f64>,
}

impl Default for Tactics {
    fn default() -> Self {
        Self {
            pace: 0,
            offense_scheme: OffenseScheme::PaceSpace,
            offense_secondary_scheme: Some(OffenseScheme::PaceSpace),
            offense_primary_weight: 5,
            offense_secondary_weight: 5,
            defense_scheme: DefenseScheme::DropCoverage,
            defense_secondary_scheme: Some(DefenseScheme::DropCoverage),
            defense_primary_weight: 5,
            defense_secondary_weight: 5,
            rotation_size: DEFAULT_ROTATION,
            starters: Vec::new(),
            bench: Vec::new(),
            minutes: BTreeMap::new(),
        }
    }
}

impl Tactics {
    // -- read access --------------------------------------------------------

    pub fn pace(&self) -> i8 {
        self.pace
    }

    pub fn rotation_size(&self) -> u8 {
        self.rotation_size
    }

    pub fn starters(&self) -> &[PlayerId] {
        &self.starters
    }

    pub fn bench(&self) -> &[PlayerId] {
        &self.bench
    }

    pub fn offense(&self) -> (OffenseScheme, Option<OffenseScheme>) {
        (self.offense_scheme, self.offense_secondary_scheme)
    }

    pub fn defense(&self) -> (DefenseScheme, Option<DefenseScheme>) {
        (self.defense_scheme, self.defense_secondary_scheme)
    }

    /// `(primary, secondary)` weights for one side.
    pub fn weights(&self, side: Side) -> (u8, u8) {
        match side {
            Side::Offense => (self.offense_primary_weight, self.offense_secondary_weight),
            Side::Defense => (self.defense_primary_weight, self.defense_secondary_weight),
        }
    }

    pub fn role_of(&self, id: &PlayerId) -> Option<Role> {
        if self.starters.contains(id) {
            Some(Role::Starter)
        } else if self.bench.contains(id) {
            Some(Role::Bench)
        } else {
            None
        }
    }

    pub fn rotation_count(&self) -> usize {
        self.starters.len() + self.bench.len()
    }

    pub fn minutes_for(&self, id: &PlayerId) -> Option<f64> {
        self.minutes.get(id).copied()
    }

    pub fn total_minutes(&self) -> f64 {
        self.minutes.values().sum()
    }

    // -- scalar settings ----------------------------------------------------

    pub fn set_pace(&mut self, pace: i8) {
        self.pace = pace.clamp(PACE_RANGE.0, PACE_RANGE.1);
    }

    pub fn cycle_primary_scheme(&mut self, side: Side) {
        match side {
            Side::Offense => self.offense_scheme = cycle(&OffenseScheme::ALL, self.offense_scheme),
            Side::Defense => self.defense_scheme = cycle(&DefenseScheme::ALL, self.defense_scheme),
        }
    }

    /// Step the secondary scheme; landing on "none" zeroes its weight.
    pub fn cycle_secondary_scheme(&mut self, side: Side) {
        let is_none = match side {
            Side::Offense => {
                self.offense_secondary_scheme =
                    cycle_optional(&OffenseScheme::ALL, self.offense_secondary_scheme);
                self.offense_secondary_scheme.is_none()
            }
            Side::Defense => {
                self.defense_secondary_scheme =
                    cycle_optional(&DefenseScheme::ALL, self.defense_secondary_scheme);
                self.defense_secondary_scheme.is_none()
            }
        };
        if is_none {
            self.set_secondary_weight(side, 0);
        }
    }

    /// Clamp the secondary weight to `0..=5`; the primary takes the remainder.
    pub fn set_secondary_weight(&mut self, side: Side, weight: u8) {
        let has_secondary = match side {
            Side::Offense => self.offense_secondary_scheme.is_some(),
            Side::Defense => self.defense_secondary_scheme.is_some(),
        };
        let secondary = if has_secondary { weight.min(MAX_SECONDARY_WEIGHT) } else { 0 };
        let primary = SCHEME_WEIGHT_TOTAL - secondary;
        match side {
            Side::Offense => {
                self.offense_primary_weight = primary;
                self.offense_secondary_weight = secondary;
            }
            Side::Defense => {
                self.defense_primary_weight = primary;
                self.defense_secondary_weight = secondary;
            }
        }
    }

    pub fn adjust_secondary_weight(&mut self, side: Side, delta: i8) {
        let (_, current) = self.weights(side);
        let next = (current as i16 + delta as i16).clamp(0, MAX_SECONDARY_WEIGHT as i16) as u8;
        self.set_secondary_weight(side, next);
    }

    /// Change the rotation size and trim the lineup to fit.
    pub fn set_rotation_size(&mut self, size: u8, roster: Option<&Roster>) {
        self.rotation_size = size.clamp(MIN_ROTATION, MAX_ROTATION);
        self.normalize(roster);
    }

    // -- lineup -------------------------------------------------------------

    /// Toggle a player's starter role. Removing always succeeds; adding is
    /// rejected at five starters or when the move would overflow the rotation.
    /// A rejected move leaves the lineup untouched.
    pub fn toggle_starter(&mut self, id: &PlayerId) -> Result<(), LineupError> {
        if let Some(pos) = self.starters.iter().position(|p| p == id) {
            self.starters.remove(pos);
            self.sync_minutes();
            return Ok(());
        }
        if self.starters.len() >= MAX_STARTERS {
            return Err(LineupError::StartersFull);
        }
        let from_bench = self.bench.contains(id);
        let projected = self.rotation_count() + usize::from(!from_bench);
        if projected > self.rotation_size as usize {
            return Err(LineupError::RotationFull { rotation_size: self.rotation_size });
        }
        self.bench.retain(|p| p != id);
        self.starters.push(id.clone());
        self.sync_minutes();
        Ok(())
    }

    /// Toggle a player's bench role. Moving a starter to the bench keeps the
    /// rotation count unchanged and is always allowed. Moving between roles
    /// keeps the player's minutes.
    pub fn toggle_bench(&mut self, id: &PlayerId) -> Result<(), LineupError> {
        if let Some(pos) = self.bench.iter().position(|p| p == id) {
            self.bench.remove(pos);
            self.sync_minutes();
            return Ok(());
        }
        let from_starters = self.starters.contains(id);
        if !from_starters && self.rotation_count() >= self.rotation_size as usize {
            return Err(LineupError::RotationFull { rotation_size: self.rotation_size });
        }
        self.starters.retain(|p| p != id);
        self.bench.push(id.clone());
        self.sync_minutes();
        Ok(())
    }

    pub fn set_minutes(&mut self, id: &PlayerId, minutes: f64) -> Result<(), LineupError> {
        if self.role_of(id).is_none() {
            return Err(LineupError::NotInRotation);
        }
        self.minutes.insert(id.clone(), snap_minutes(minutes));
        Ok(())
    }

    pub fn adjust_minutes(&mut self, id: &PlayerId, delta: f64) -> Result<(), LineupError> {
        let role = self.role_of(id).ok_or(LineupError::NotInRotation)?;
        let current = self
            .minutes_for(id)
            .unwrap_or_else(|| default_minutes(role, self.rotation_size));
        self.set_minutes(id, current + delta)
    }

    /// Reconcile the lineup with a roster: drop unknown ids, keep at most five
    /// starters, trim the bench to the remaining rotation slots, then refresh
    /// minutes. Without a roster only the capacity limits are applied.
    pub fn normalize(&mut self, roster: Option<&Roster>) {
        if let Some(roster) = roster {
            self.starters.retain(|id| roster.contains(id));
            self.bench.retain(|id| roster.contains(id));
        }
        dedup_in_order(&mut self.starters);
        dedup_in_order(&mut self.bench);
        let starters = &self.starters;
        self.bench.retain(|id| !starters.contains(id));

        self.starters.truncate(MAX_STARTERS);
        let max_bench = (self.rotation_size as usize).saturating_sub(self.starters.len());
        self.bench.truncate(max_bench);
        self.set_secondary_weight(Side::Offense, self.offense_secondary_weight);
        self.set_secondary_weight(Side::Defense, self.defense_secondary_weight);
        self.pace = self.pace.clamp(PACE_RANGE.0, PACE_RANGE.1);
        self.rotation_size = self.rotation_size.clamp(MIN_ROTATION, MAX_ROTATION);
        self.sync_minutes();
    }

    /// Give every rotation player a default if unset and drop everyone else.
    fn sync_minutes(&mut self) {
        let rotation = self.rotation_size;
        for id in &self.starters {
            self.minutes
                .entry(id.clone())
                .or_insert_with(|| default_minutes(Role::Starter, rotation));
        }
        for id in &self.bench {
            self.minutes
                .entry(id.clone())
                .or_insert_with(|| default_minutes(Role::Bench, rotation));
        }
        let (starters, bench) = (&self.starters, &self.bench);
        self.minutes
            .retain(|id, _| starters.contains(id) || bench.contains(id));
        for m in self.minutes.values_mut() {
            *m = snap_minutes(*m);
        }
    }

    /// JSON payload for the simulation endpoint.
    pub fn to_payload(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

fn dedup_in_order(ids: &mut Vec<PlayerId>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(id.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_api::RosterPlayer;

    fn pid(n: u32) -> PlayerId {
        PlayerId(n.to_string())
    }

    fn roster(count: u32) -> Roster {
        Roster {
            team_id: "BOS".into(),
            players: (1..=count)
                .map(|n| RosterPlayer {
                    id: pid(n),
                    name: format!("Player {n}"),
                    pos: "G".into(),
                    overall: Some(70.0),
                })
                .collect(),
        }
    }

    fn assert_invariants(t: &Tactics) {
        assert!(t.starters().len() <= MAX_STARTERS);
        assert!(t.rotation_count() <= t.rotation_size() as usize);
        for side in [Side::Offense, Side::Defense] {
            let (p, s) = t.weights(side);
            assert_eq!(p + s, SCHEME_WEIGHT_TOTAL);
            assert!(s <= MAX_SECONDARY_WEIGHT);
        }
        for id in t.minutes.keys() {
            assert!(t.role_of(id).is_some());
        }
    }

    #[test]
    fn defaults_match_engine_baseline() {
        let t = Tactics::default();
        assert_eq!(t.pace(), 0);
        assert_eq!(t.rotation_size(), 9);
        assert_eq!(t.weights(Side::Offense), (5, 5));
        assert_eq!(t.weights(Side::Defense), (5, 5));
        assert_eq!(t.offense(), (OffenseScheme::PaceSpace, Some(OffenseScheme::PaceSpace)));
        assert!(t.starters().is_empty() && t.bench().is_empty());
    }

    #[test]
    fn sixth_starter_is_rejected_and_lineup_unchanged() {
        let mut t = Tactics::default();
        for n in 1..=5 {
            t.toggle_starter(&pid(n)).expect("room for five");
        }
        let before = t.clone();
        assert_eq!(t.toggle_starter(&pid(6)), Err(LineupError::StartersFull));
        assert_eq!(t, before);
        assert_invariants(&t);
    }

    #[test]
    fn toggling_existing_role_removes_player() {
        let mut t = Tactics::default();
        t.toggle_starter(&pid(1)).expect("add");
        t.toggle_starter(&pid(1)).expect("remove");
        assert!(t.starters().is_empty());
        assert_eq!(t.minutes_for(&pid(1)), None);

        t.toggle_bench(&pid(2)).expect("add");
        t.toggle_bench(&pid(2)).expect("remove");
        assert!(t.bench().is_empty());
    }

    #[test]
    fn bench_add_rejected_when_rotation_full() {
        let mut t = Tactics::default();
        t.set_rotation_size(6, None);
        for n in 1..=5 {
            t.toggle_starter(&pid(n)).expect("starter");
        }
        t.toggle_bench(&pid(6)).expect("sixth fits");
        let before = t.clone();
        assert_eq!(
            t.toggle_bench(&pid(7)),
            Err(LineupError::RotationFull { rotation_size: 6 })
        );
        assert_eq!(t, before);
    }

    #[test]
    fn starter_add_rejected_when_it_would_overflow_rotation() {
        let mut t = Tactics::default();
        t.set_rotation_size(6, None);
        for n in 1..=6 {
            t.toggle_bench(&pid(n)).expect("bench");
        }
        let before = t.clone();
        assert_eq!(
            t.toggle_starter(&pid(7)),
            Err(LineupError::RotationFull { rotation_size: 6 })
        );
        assert_eq!(t, before);

        // promoting an existing bench player keeps the count and is allowed
        t.toggle_starter(&pid(1)).expect("promote");
        assert_eq!(t.role_of(&pid(1)), Some(Role::Starter));
        assert_eq!(t.rotation_count(), 6);
        assert_invariants(&t);
    }

    #[test]
    fn moving_starter_to_full_bench_is_allowed() {
        let mut t = Tactics::default();
        t.set_rotation_size(6, None);
        for n in 1..=5 {
            t.toggle_starter(&pid(n)).expect("starter");
        }
        t.toggle_bench(&pid(6)).expect("bench");
        t.toggle_bench(&pid(1)).expect("demote");
        assert_eq!(t.role_of(&pid(1)), Some(Role::Bench));
        assert_eq!(t.starters().len(), 4);
        assert_invariants(&t);
    }

    #[test]
    fn minutes_default_by_role_and_rotation() {
        let mut t = Tactics::default();
        t.toggle_starter(&pid(1)).expect("starter");
        t.toggle_bench(&pid(2)).expect("bench");
        assert_eq!(t.minutes_for(&pid(1)), Some(28.0));
        assert_eq!(t.minutes_for(&pid(2)), Some(25.0));

        assert_eq!(default_minutes(Role::Starter, 6), 41.0);
        assert_eq!(default_minutes(Role::Bench, 10), 23.0);
        assert_eq!(default_minutes(Role::Starter, 11), 32.0);
        assert_eq!(default_minutes(Role::Bench, 3), 22.0);
    }

    #[test]
    fn minutes_clamp_and_snap_to_half() {
        let mut t = Tactics::default();
        t.toggle_starter(&pid(1)).expect("starter");
        t.set_minutes(&pid(1), 50.0).expect("rotation player");
        assert_eq!(t.minutes_for(&pid(1)), Some(48.0));
        t.set_minutes(&pid(1), -3.0).expect("rotation player");
        assert_eq!(t.minutes_for(&pid(1)), Some(0.0));
        t.set_minutes(&pid(1), 30.3).expect("rotation player");
        assert_eq!(t.minutes_for(&pid(1)), Some(30.5));
        t.adjust_minutes(&pid(1), -0.5).expect("rotation player");
        assert_eq!(t.minutes_for(&pid(1)), Some(30.0));
        assert_eq!(t.set_minutes(&pid(9), 20.0), Err(LineupError::NotInRotation));
    }

    #[test]
    fn weights_always_sum_to_ten() {
        let mut t = Tactics::default();
        t.set_secondary_weight(Side::Offense, 9);
        assert_eq!(t.weights(Side::Offense), (5, 5));
        t.set_secondary_weight(Side::Offense, 2);
        assert_eq!(t.weights(Side::Offense), (8, 2));
        t.adjust_secondary_weight(Side::Defense, -7);
        assert_eq!(t.weights(Side::Defense), (10, 0));
        t.adjust_secondary_weight(Side::Defense, 3);
        assert_eq!(t.weights(Side::Defense), (7, 3));
    }

    #[test]
    fn secondary_none_forces_full_primary_weight() {
        let mut t = Tactics::default();
        // PaceSpace -> ... -> IsoHeavy -> None
        for _ in 0..5 {
            t.cycle_secondary_scheme(Side::Offense);
        }
        assert_eq!(t.offense().1, None);
        assert_eq!(t.weights(Side::Offense), (10, 0));
        t.adjust_secondary_weight(Side::Offense, 2);
        assert_eq!(t.weights(Side::Offense), (10, 0));

        t.cycle_secondary_scheme(Side::Offense);
        assert_eq!(t.offense().1, Some(OffenseScheme::PaceSpace));
        t.adjust_secondary_weight(Side::Offense, 2);
        assert_eq!(t.weights(Side::Offense), (8, 2));
    }

    #[test]
    fn shrinking_rotation_trims_bench_and_minutes() {
        let mut t = Tactics::default();
        for n in 1..=5 {
            t.toggle_starter(&pid(n)).expect("starter");
        }
        for n in 6..=9 {
            t.toggle_bench(&pid(n)).expect("bench");
        }
        t.set_rotation_size(7, None);
        assert_eq!(t.bench(), &[pid(6), pid(7)]);
        assert_eq!(t.minutes_for(&pid(9)), None);
        assert_invariants(&t);

        t.set_rotation_size(42, None);
        assert_eq!(t.rotation_size(), MAX_ROTATION);
    }

    #[test]
    fn normalize_drops_players_not_on_roster() {
        let mut t = Tactics::default();
        for n in 1..=3 {
            t.toggle_starter(&pid(n)).expect("starter");
        }
        t.toggle_bench(&pid(20)).expect("bench");
        t.normalize(Some(&roster(12)));
        assert_eq!(t.starters(), &[pid(1), pid(2), pid(3)]);
        assert!(t.bench().is_empty());
        assert_eq!(t.minutes_for(&pid(20)), None);
        assert_invariants(&t);
    }

    #[test]
    fn normalize_repairs_deserialized_overflow() {
        let json = r#"{
            "pace": 7,
            "offenseScheme": "motion",
            "offenseSecondaryScheme": null,
            "offensePrimaryWeight": 3,
            "offenseSecondaryWeight": 7,
            "defenseScheme": "zone",
            "defenseSecondaryScheme": "ice",
            "defensePrimaryWeight": 1,
            "defenseSecondaryWeight": 9,
            "rotationSize": 6,
            "starters": ["1","2","3","4","5","6"],
            "bench": ["7","8"],
            "minutes": {"1": 60, "99": 10}
        }"#;
        let mut t: Tactics = serde_json::from_str(json).expect("tactics json");
        t.normalize(Some(&roster(12)));
        assert_eq!(t.pace(), 2);
        assert_eq!(t.starters().len(), 5);
        assert_eq!(t.bench(), &[pid(7)]);
        assert_eq!(t.minutes_for(&pid(1)), Some(48.0));
        assert_eq!(t.minutes_for(&pid(99)), None);
        assert_eq!(t.weights(Side::Offense), (10, 0));
        assert_eq!(t.weights(Side::Defense), (5, 5));
        assert_invariants(&t);
    }

    #[test]
    fn payload_uses_engine_field_names() {
        let mut t = Tactics::default();
        t.toggle_starter(&pid(1)).expect("starter");
        let payload = t.to_payload().expect("serializable");
        assert_eq!(payload["rotationSize"], 9);
        assert_eq!(payload["offenseScheme"], "pace_space");
        assert_eq!(payload["defenseSecondaryScheme"], "drop_coverage");
        assert_eq!(payload["starters"][0], "1");
        assert_eq!(payload["minutes"]["1"], 28.0);
    }

    #[test]
    fn pace_is_clamped_and_labelled() {
        let mut t = Tactics::default();
        t.set_pace(-5);
        assert_eq!(t.pace(), -2);
        assert_eq!(pace_label(t.pace()), "Very slow");
        t.set_pace(1);
        assert_eq!(pace_label(t.pace()), "Fast");
    }

    #[test]
    fn role_change_keeps_edited_minutes() {
        let mut t = Tactics::default();
        t.toggle_starter(&pid(1)).expect("starter");
        t.set_minutes(&pid(1), 36.5).expect("rotation player");

        t.toggle_bench(&pid(1)).expect("to bench");
        assert_eq!(t.bench(), &[pid(1)]);
        assert_eq!(t.minutes_for(&pid(1)), Some(36.5));

        t.toggle_starter(&pid(1)).expect("back to starter");
        assert_eq!(t.starters(), &[pid(1)]);
        assert_eq!(t.minutes_for(&pid(1)), Some(36.5));

        t.toggle_bench(&pid(2)).expect("bench");
        assert_eq!(t.minutes_for(&pid(2)), Some(25.0));
    }

    #[test]
    fn total_minutes_sums_rotation() {
        let mut t = Tactics::default();
        for n in 1..=5 {
            t.toggle_starter(&pid(n)).expect("starter");
        }
        for n in 6..=9 {
            t.toggle_bench(&pid(n)).expect("bench");
        }
        assert_eq!(t.total_minutes(), 5.0 * 28.0 + 4.0 * 25.0);
    }
}
