use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Reveal Party API 🎉
Version: {version}

Guest endpoints:
  - GET    /api/view                 - Page payload for this browser
  - POST   /api/predictions          - Submit a boy/girl prediction
  - POST   /api/predictions/find     - Find my prediction by email
  - GET    /api/stats?guess=boy      - Prediction tallies
  - GET    /api/reveal               - Countdown and reveal flag
  - GET    /api/reveal/events        - Live reveal updates (SSE)
  - GET    /api/registries           - Gift registry links

Admin endpoints:
  - POST   /admin/login              - Exchange the password for the admin cookie
  - POST   /admin/logout             - Clear the admin cookie
  - GET    /admin/dashboard          - Reveal state, predictions, stats, registries
  - PUT    /admin/reveal             - Save countdown date, gender, reveal flag
  - DELETE /admin/predictions/{{id}}   - Delete a prediction
  - POST   /admin/registries         - Add a registry link
  - DELETE /admin/registries/{{id}}    - Remove a registry link

Operations:
  - GET    /health                   - Light health check
  - GET    /health?mode=full         - Full health check (Redis and Postgres)
  - GET    /metrics                  - Prometheus metrics
"#
    )
}
