use std::process::ExitCode;

use con2fif::{cli::Args, check_inputs, convert, MneSession};

fn main() -> ExitCode {
    let args = Args::parse_legacy(std::env::args_os());

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .format_timestamp(None)
        .format_target(false)
        .init();

    let inputs = args.inputs();
    let cfg = args.config();
    let name = inputs.con.to_string_lossy();
    log::info!(
        "Converting {} to .fif file and applying maxwell filtering",
        name.rsplit('/').next().unwrap_or(&name)
    );

    let result = check_inputs(&inputs).and_then(|_| {
        log::info!("Importing MNE");
        MneSession::start(&cfg.python)
    });
    let result = result.and_then(|mut mne| {
        log::debug!("MNE-Python {}", mne.mne_version());
        convert(&mut mne, &inputs, args.bad_chan.as_deref(), &cfg)
    });

    match result {
        Ok(outcome) => {
            println!("Written → {}", outcome.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
