use anyhow::Context;
use flexi_logger::{colored_with_thread, Logger, WriteMode};
use log::info;

use prefix_trie::{Config, PrefixTree, Server};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // hold on to the handle, the logger stops when it is dropped
    let _logger = Logger::try_with_str(&config.log_spec)
        .with_context(|| format!("invalid log specification {:?}", config.log_spec))?
        .log_to_stdout()
        .write_mode(WriteMode::Async)
        .format(colored_with_thread)
        .use_utc()
        .start()?;

    let addr = config.addr();
    info!("server starting on {}", addr);

    Server::with_frame_limit(PrefixTree::new(), config.max_frame_len)
        .run_blocking(&addr)
        .with_context(|| format!("failed to serve on {}", addr))
}
