use pathclip::commands::{self, Invocation, MULTICALL_NAME, ProcessContext};
use pathclip::config::Config;

/// Multi-call entry point: the name this binary runs under selects the command.
fn main() {
    init_logging();

    let invocation = match Invocation::from_args(std::env::args_os()) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("{MULTICALL_NAME}: {e}");
            std::process::exit(1);
        }
    };
    let name = invocation.kind.name();

    if let Some(result) = commands::run_without_context(&invocation) {
        if let Err(e) = result {
            eprintln!("{name}: {e}");
            std::process::exit(1);
        }
        return;
    }

    // 設定ファイルを読み込む
    let context = match Config::load().and_then(ProcessContext::new) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{name}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::run(invocation, &context) {
        eprintln!("{}", context.painter.error(format!("{name}: {e}")));
        std::process::exit(1);
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_env("PATHCLIP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
