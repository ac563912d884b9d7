//! Single binary web server: REST API over in-memory tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, INACTIVITY_HOURS, PAIRING_SEED (fixed seed for round-1 shuffles).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use swiss_tournament_web::{
    complete_tournament, current_standings, generate_next_round, report_result,
    seat_current_round, standings_csv, start_tournament, swap_players, MatchId, MatchResult,
    PlayerId, Tournament, TournamentError, TournamentFormat, TournamentId,
};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

type Tournaments = RwLock<HashMap<TournamentId, TournamentEntry>>;
type AppState = Data<Tournaments>;

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    inactivity_timeout: Duration,
    pairing_seed: Option<u64>,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_parse("PORT").unwrap_or(8080);
        let hours: u64 = env_parse("INACTIVITY_HOURS").unwrap_or(12);
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(hours * 3600),
            pairing_seed: env_parse("PAIRING_SEED"),
        }
    }

    /// Seeded generator when PAIRING_SEED is set, the thread RNG otherwise.
    fn rng_for_round(&self, round: u32) -> Box<dyn RngCore> {
        match self.pairing_seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed ^ u64::from(round))),
            None => Box::new(rand::thread_rng()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default)]
    max_rounds: Option<u32>,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct SetSeatBody {
    seat: Option<u32>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    result: MatchResult,
}

#[derive(Deserialize)]
struct SwapBody {
    match_a: MatchId,
    player_a: PlayerId,
    match_b: MatchId,
    player_b: PlayerId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and player id.
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn error_response(e: TournamentError) -> HttpResponse {
    match e {
        TournamentError::Pairing(ref pe) if !pe.is_input_error() => {
            log::error!("Pairing engine failure: {}", pe);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Failed to generate pairings" }))
        }
        e => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Run `f` on a tournament (404 if missing), refreshing its last activity.
fn with_entry<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.tournament)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Apply a mutation and answer with the updated tournament, or the error.
fn mutate<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    with_entry(state, id, |t| match f(t) {
        Ok(()) => HttpResponse::Ok().json(&*t),
        Err(e) => error_response(e),
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-tournament-web",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Tournament name must not be empty" }));
    }
    let mut tournament = Tournament::new(name, body.format);
    tournament.max_rounds = body.max_rounds;
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    log::info!("Created tournament {}", id);
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |t| HttpResponse::Ok().json(&*t))
}

/// Register a player (Setup only).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: AppState, path: Path<TournamentPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    mutate(&state, path.id, |t| t.add_player(body.name.as_str()).map(|_| ()))
}

/// Remove a player by id (Setup only).
#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate(&state, path.id, |t| t.remove_player(path.player_id))
}

/// Drop a player from future rounds.
#[post("/api/tournaments/{id}/players/{player_id}/drop")]
async fn api_drop_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    mutate(&state, path.id, |t| t.drop_player(path.player_id))
}

/// Set or clear a player's static seat.
#[put("/api/tournaments/{id}/players/{player_id}/seat")]
async fn api_set_seat(state: AppState, path: Path<TournamentPlayerPath>, body: Json<SetSeatBody>) -> HttpResponse {
    mutate(&state, path.id, |t| t.set_static_seat(path.player_id, body.seat))
}

/// Start the tournament and pair round 1.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(
    state: AppState,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut rng = config.rng_for_round(1);
    mutate(&state, path.id, |t| start_tournament(t, &mut *rng))
}

/// Pair the next round (current round must be fully reported).
#[post("/api/tournaments/{id}/rounds/next")]
async fn api_next_round(
    state: AppState,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    mutate(&state, path.id, |t| {
        let mut rng = config.rng_for_round(t.current_round + 1);
        generate_next_round(t, &mut *rng)
    })
}

#[put("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    mutate(&state, path.id, |t| report_result(t, path.match_id, body.result))
}

/// Manual pairing edit: swap two players between current-round matches.
#[post("/api/tournaments/{id}/matches/swap")]
async fn api_swap_players(state: AppState, path: Path<TournamentPath>, body: Json<SwapBody>) -> HttpResponse {
    mutate(&state, path.id, |t| {
        swap_players(t, body.match_a, body.player_a, body.match_b, body.player_b)
    })
}

#[post("/api/tournaments/{id}/complete")]
async fn api_complete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, complete_tournament)
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |t| HttpResponse::Ok().json(current_standings(t)))
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |t| match standings_csv(&current_standings(t)) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    })
}

#[get("/api/tournaments/{id}/seating")]
async fn api_seating(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |t| {
        let (pairings, plan) = seat_current_round(t);
        HttpResponse::Ok().json(serde_json::json!({ "pairings": pairings, "seating": plan }))
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);
    if let Some(seed) = config.pairing_seed {
        log::info!("Round-1 shuffles use fixed seed {}", seed);
    }

    let state: AppState = Data::new(RwLock::new(HashMap::new()));

    // Background task: every 30 minutes, remove tournaments idle past the timeout
    let state_cleanup = state.clone();
    let timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s)", removed);
            }
        }
    });

    let bind = (config.host.clone(), config.port);
    let config = Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_drop_player)
            .service(api_set_seat)
            .service(api_start_tournament)
            .service(api_next_round)
            .service(api_report_result)
            .service(api_swap_players)
            .service(api_complete_tournament)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_seating)
    })
    .bind(bind)?
    .run()
    .await
}
