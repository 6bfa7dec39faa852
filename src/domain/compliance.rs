//! Building-code reference data for roofing work, keyed by US state.
//!
//! The table is static: it mirrors the adopted residential code edition and
//! the climate exposure a roofing crew has to plan for. Values are coarse on
//! purpose; local amendments always win and every report says so.

use serde::Serialize;

use crate::domain::types::StateCode;

/// Design wind exposure used to pick fastening schedules.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum WindZone {
    /// Basic design speed below 115 mph.
    Standard,
    /// Basic design speed 115-140 mph.
    High,
    /// Hurricane-prone region; wind-borne debris provisions apply.
    Hurricane,
}

/// Seismic design category for typical residential sites.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum SeismicCategory {
    A,
    B,
    C,
    D,
    E,
}

/// Static code metadata for one state.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct StateCodeProfile {
    pub state: &'static str,
    pub name: &'static str,
    pub code_edition: &'static str,
    pub wind_zone: WindZone,
    pub seismic: SeismicCategory,
    pub ice_barrier_required: bool,
    pub hail_prone: bool,
}

/// Lookup result returned to callers.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ComplianceReport {
    pub profile: StateCodeProfile,
    pub recommendations: Vec<String>,
}

macro_rules! profile {
    ($state:literal, $name:literal, $code:literal, $wind:ident, $seismic:ident, $ice:literal, $hail:literal) => {
        StateCodeProfile {
            state: $state,
            name: $name,
            code_edition: $code,
            wind_zone: WindZone::$wind,
            seismic: SeismicCategory::$seismic,
            ice_barrier_required: $ice,
            hail_prone: $hail,
        }
    };
}

static PROFILES: &[StateCodeProfile] = &[
    profile!("AL", "Alabama", "IRC 2021", Hurricane, B, false, true),
    profile!("AK", "Alaska", "IRC 2018", Standard, E, true, false),
    profile!("AZ", "Arizona", "IRC 2018", Standard, C, false, false),
    profile!("AR", "Arkansas", "IRC 2021", Standard, C, false, true),
    profile!("CA", "California", "California Residential Code 2022", Standard, E, false, false),
    profile!("CO", "Colorado", "IRC 2021", Standard, B, true, true),
    profile!("CT", "Connecticut", "IRC 2021", High, B, true, false),
    profile!("DE", "Delaware", "IRC 2018", High, A, true, false),
    profile!("DC", "District of Columbia", "IRC 2015", Standard, A, true, false),
    profile!("FL", "Florida", "Florida Building Code 8th Ed. (2023)", Hurricane, A, false, false),
    profile!("GA", "Georgia", "IRC 2018", High, B, false, true),
    profile!("HI", "Hawaii", "IRC 2018", Hurricane, D, false, false),
    profile!("ID", "Idaho", "IRC 2018", Standard, D, true, false),
    profile!("IL", "Illinois", "IRC 2021", Standard, C, true, true),
    profile!("IN", "Indiana", "IRC 2018", Standard, B, true, true),
    profile!("IA", "Iowa", "IRC 2021", Standard, A, true, true),
    profile!("KS", "Kansas", "IRC 2018", Standard, A, true, true),
    profile!("KY", "Kentucky", "IRC 2018", Standard, C, true, true),
    profile!("LA", "Louisiana", "IRC 2021", Hurricane, A, false, true),
    profile!("ME", "Maine", "IRC 2021", Standard, B, true, false),
    profile!("MD", "Maryland", "IRC 2021", High, A, true, false),
    profile!("MA", "Massachusetts", "780 CMR 10th Ed. (IRC 2021)", High, B, true, false),
    profile!("MI", "Michigan", "Michigan Residential Code 2015", Standard, A, true, true),
    profile!("MN", "Minnesota", "Minnesota Residential Code 2020", Standard, A, true, true),
    profile!("MS", "Mississippi", "IRC 2021", Hurricane, B, false, true),
    profile!("MO", "Missouri", "IRC 2018", Standard, C, true, true),
    profile!("MT", "Montana", "IRC 2021", Standard, D, true, true),
    profile!("NE", "Nebraska", "IRC 2018", Standard, A, true, true),
    profile!("NV", "Nevada", "IRC 2018", Standard, D, true, false),
    profile!("NH", "New Hampshire", "IRC 2018", Standard, B, true, false),
    profile!("NJ", "New Jersey", "IRC 2021 (NJ Edition)", High, B, true, false),
    profile!("NM", "New Mexico", "IRC 2021", Standard, C, true, true),
    profile!("NY", "New York", "Residential Code of NYS 2020", High, B, true, false),
    profile!("NC", "North Carolina", "NC Residential Code 2018", Hurricane, C, false, true),
    profile!("ND", "North Dakota", "IRC 2021", Standard, A, true, true),
    profile!("OH", "Ohio", "Residential Code of Ohio 2019", Standard, B, true, true),
    profile!("OK", "Oklahoma", "IRC 2018", Standard, C, false, true),
    profile!("OR", "Oregon", "Oregon Residential Specialty Code 2023", Standard, D, true, false),
    profile!("PA", "Pennsylvania", "IRC 2018", Standard, B, true, false),
    profile!("RI", "Rhode Island", "IRC 2021", High, B, true, false),
    profile!("SC", "South Carolina", "IRC 2021", Hurricane, D, false, true),
    profile!("SD", "South Dakota", "IRC 2021", Standard, A, true, true),
    profile!("TN", "Tennessee", "IRC 2018", Standard, D, false, true),
    profile!("TX", "Texas", "IRC 2021", Hurricane, A, false, true),
    profile!("UT", "Utah", "IRC 2021", Standard, D, true, false),
    profile!("VT", "Vermont", "IRC 2018", Standard, B, true, false),
    profile!("VA", "Virginia", "Virginia Residential Code 2021", High, B, true, false),
    profile!("WA", "Washington", "IRC 2021 (WA amendments)", Standard, D, true, false),
    profile!("WV", "West Virginia", "IRC 2015", Standard, B, true, false),
    profile!("WI", "Wisconsin", "Uniform Dwelling Code", Standard, A, true, true),
    profile!("WY", "Wyoming", "IRC 2021", Standard, C, true, true),
];

/// Returns the static profile for the given state, if known.
pub fn lookup(state: &StateCode) -> Option<&'static StateCodeProfile> {
    PROFILES.iter().find(|p| p.state == state.as_str())
}

/// Builds the recommendation list for a profile.
pub fn recommendations(profile: &StateCodeProfile) -> Vec<String> {
    let mut out = Vec::new();

    match profile.wind_zone {
        WindZone::Hurricane => {
            out.push(
                "Hurricane-prone region: use six-nail shingle fastening, sealed roof deck and \
                 high-wind rated starter strips."
                    .to_string(),
            );
            out.push("Document wind mitigation features for the carrier.".to_string());
        }
        WindZone::High => out.push(
            "High design wind speed: use six-nail fastening and high-wind rated shingles."
                .to_string(),
        ),
        WindZone::Standard => {}
    }

    if profile.ice_barrier_required {
        out.push(
            "Install ice barrier underlayment from the eaves to 24 inches inside the exterior \
             wall line."
                .to_string(),
        );
    }

    if matches!(profile.seismic, SeismicCategory::D | SeismicCategory::E) {
        out.push(
            "High seismic category: verify roof-to-wall connections and weight limits before \
             switching to tile or slate."
                .to_string(),
        );
    }

    if profile.hail_prone {
        out.push(
            "Hail-prone area: quote Class 4 impact-resistant shingles; many carriers discount \
             premiums for them."
                .to_string(),
        );
    }

    out.push(format!(
        "Verify local amendments to the {} with the jurisdiction before permitting.",
        profile.code_edition
    ));

    out
}

/// Full compliance report for a state.
pub fn check(state: &StateCode) -> Option<ComplianceReport> {
    lookup(state).map(|profile| ComplianceReport {
        profile: *profile,
        recommendations: recommendations(profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str) -> StateCode {
        StateCode::new(code).expect("valid state")
    }

    #[test]
    fn covers_every_state_once() {
        assert_eq!(PROFILES.len(), 51);
        let mut codes: Vec<_> = PROFILES.iter().map(|p| p.state).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 51);
    }

    #[test]
    fn lookup_is_case_insensitive_via_state_code() {
        let profile = lookup(&state("fl")).expect("florida");
        assert_eq!(profile.name, "Florida");
        assert_eq!(profile.wind_zone, WindZone::Hurricane);
    }

    #[test]
    fn unknown_states_are_not_found() {
        assert!(check(&state("ZZ")).is_none());
    }

    #[test]
    fn recommendations_follow_exposure() {
        let texas = check(&state("TX")).expect("texas");
        assert!(texas.recommendations.iter().any(|r| r.contains("Hurricane")));
        assert!(texas.recommendations.iter().any(|r| r.contains("Class 4")));
        assert!(!texas.recommendations.iter().any(|r| r.contains("ice barrier")));

        let minnesota = check(&state("MN")).expect("minnesota");
        assert!(minnesota.recommendations.iter().any(|r| r.contains("ice barrier")));
        assert!(
            minnesota
                .recommendations
                .last()
                .expect("always present")
                .contains("Minnesota Residential Code 2020")
        );
    }
}
