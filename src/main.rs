use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = svrdb::config::Config::parse();
    svrdb::run(cfg)
}
