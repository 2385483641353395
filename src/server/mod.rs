mod app;
mod middleware;
mod state;

pub use app::create_app;
pub use middleware::access_gate;
pub use state::AppState;
