use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

/// Maximum number of hits returned by a pilot search
pub const MAX_SEARCH_RESULTS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pilot {
    pub code: &'static str, // 3-letter code used by the results API (e.g. "VER")
    pub name: &'static str,
    pub team: &'static str,
}

const fn pilot(code: &'static str, name: &'static str, team: &'static str) -> Pilot {
    Pilot { code, name, team }
}

/// 2026 grid: 22 drivers, 11 teams
pub const PILOTS: [Pilot; 22] = [
    pilot("NOR", "Lando Norris", "McLaren"),
    pilot("PIA", "Oscar Piastri", "McLaren"),
    pilot("RUS", "George Russell", "Mercedes"),
    pilot("ANT", "Kimi Antonelli", "Mercedes"),
    pilot("LEC", "Charles Leclerc", "Ferrari"),
    pilot("HAM", "Lewis Hamilton", "Ferrari"),
    pilot("VER", "Max Verstappen", "Red Bull"),
    pilot("HAD", "Isack Hadjar", "Red Bull"),
    pilot("LAW", "Liam Lawson", "Racing Bulls"),
    pilot("LIN", "Arvid Lindblad", "Racing Bulls"),
    pilot("ALO", "Fernando Alonso", "Aston Martin"),
    pilot("STR", "Lance Stroll", "Aston Martin"),
    pilot("SAI", "Carlos Sainz", "Williams"),
    pilot("ALB", "Alexander Albon", "Williams"),
    pilot("GAS", "Pierre Gasly", "Alpine"),
    pilot("COL", "Franco Colapinto", "Alpine"),
    pilot("OCO", "Esteban Ocon", "Haas"),
    pilot("BEA", "Oliver Bearman", "Haas"),
    pilot("HUL", "Nico Hulkenberg", "Audi"),
    pilot("BOR", "Gabriel Bortoleto", "Audi"),
    pilot("PER", "Sergio Perez", "Cadillac"),
    pilot("BOT", "Valtteri Bottas", "Cadillac"),
];

/// Looks up a pilot by code, ignoring case
pub fn by_code(code: &str) -> Option<&'static Pilot> {
    PILOTS
        .iter()
        .find(|pilot| pilot.code.eq_ignore_ascii_case(code.trim()))
}

pub fn is_known(code: &str) -> bool {
    by_code(code).is_some()
}

/// Display name for a driver code, falling back to the raw code for drivers
/// missing from the roster (reserve drivers, mid-season swaps)
pub fn display_name(code: &str) -> String {
    by_code(code)
        .map(|pilot| pilot.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Case-insensitive substring search over code, name and team
pub fn search(query: &str) -> Vec<&'static Pilot> {
    let query = query.trim().to_lowercase();
    PILOTS
        .iter()
        .filter(|pilot| {
            pilot.code.to_lowercase().contains(&query)
                || pilot.name.to_lowercase().contains(&query)
                || pilot.team.to_lowercase().contains(&query)
        })
        .take(MAX_SEARCH_RESULTS)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PilotSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// HTTP handler for pilot autocomplete
///
/// GET /pilots?q=
pub async fn search_pilots(Query(query): Query<PilotSearchQuery>) -> Json<Vec<Pilot>> {
    Json(search(&query.q).into_iter().copied().collect())
}
