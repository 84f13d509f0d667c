use clap::CommandFactory;
use clap_complete::{Shell, generate_to};
use std::env;
use std::io::Error;
use std::path::PathBuf;

include!("src/args.rs");

const BIN_NAME: &str = "epiparams";

fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=src/args.rs");
    let mut cmd = Args::command();

    if let Some(out_dir) = env::var_os("OUT_DIR") {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            generate_to(shell, &mut cmd, BIN_NAME, &out_dir)?;
        }
    }

    // Fish picks up completions from the user config without any setup.
    let Some(home_dir) = env::var_os("HOME") else {
        return Ok(());
    };
    let fish_completions = PathBuf::from(home_dir).join(".config/fish/completions");
    if fish_completions.is_dir() {
        let path = generate_to(Shell::Fish, &mut cmd, BIN_NAME, fish_completions)?;
        println!("cargo:warning=fish completions written to {}", path.display());
    }

    Ok(())
}
