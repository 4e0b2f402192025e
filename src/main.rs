use std::env;
use std::process::ExitCode;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::{fmt, EnvFilter};
use vote_client::{screens, session, view, AppError, Config};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()))
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("failed to init logging: {err}");
        return ExitCode::FAILURE;
    }

    let config = Config::from_env();
    let session = session::load(&config.session_path).await;
    let mut app = screens::App::new(config, session);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.as_slice() {
        [] => run_main(&mut app, &mut input, &mut out).await,
        [value] if value.contains("share=") => {
            run_share(&mut app, &mut input, &mut out, value).await
        }
        [command, value] if command == "share" => {
            run_share(&mut app, &mut input, &mut out, value).await
        }
        _ => {
            eprintln!("usage: vote_client [share <token-or-url>]");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Session guard, then the list screen. No persisted credential sends the
/// user through the auth screen first; declining it ends the program.
async fn run_main(
    app: &mut screens::App,
    input: &mut impl std::io::BufRead,
    out: &mut impl std::io::Write,
) -> vote_client::errors::Result<()> {
    if screens::auth::run(app, input, out).await? {
        screens::list::run(app, input, out).await?;
    }
    Ok(())
}

/// Share resolver: runs without the session guard.
async fn run_share(
    app: &mut screens::App,
    input: &mut impl std::io::BufRead,
    out: &mut impl std::io::Write,
    value: &str,
) -> vote_client::errors::Result<()> {
    match view::share_token_from_input(value) {
        Some(token) => screens::share::run(app, input, out, &token).await,
        None => Err(AppError::invalid(format!("no share token in {value:?}"))),
    }
}
