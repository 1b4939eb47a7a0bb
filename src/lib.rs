pub mod acl;
pub mod cli;
pub mod codec;
pub mod config;
pub mod cred;
pub mod diagnostics;
pub mod error;
pub mod persist;
pub mod render;
pub mod session;
pub mod subject;
pub mod svr;
pub mod x509;

pub use error::{Error, Result};
pub use persist::{ByteStore, ResourceKind};
pub use session::SvrSession;

pub fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(db = %cfg.db.display(), "Starting svrdb");

    // Preflight checks
    diagnostics::check(&cfg)?;

    let storage = persist::FileByteStore::open(&cfg.db);
    let mut session = SvrSession::new(storage);

    // Credentials merge on every refresh, so load everything exactly once.
    let report = session.refresh(&ResourceKind::ALL);
    for (kind, err) in report.failures() {
        if err.is_not_found() {
            tracing::info!(kind = %kind, "Resource absent from database");
        } else {
            eprintln!("WARNING: {kind} not loaded: {err}");
        }
    }
    tracing::info!(
        creds = session.credentials().len(),
        aces = session.acl().len(),
        "SVR database loaded"
    );

    let out = cli::dispatch(&mut session, cfg.command)?;
    print!("{out}");
    Ok(())
}
