use anyhow::{Context, Result, bail};
use clap::{arg, command};
use std::process::ExitCode;
use tilewm_core::Reply;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use xdg::BaseDirectories;

const SOCKET_NAME: &str = "command.sock";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = get_command().get_matches();

    if matches.get_flag("list") {
        print_commandlist();
    }
    let Some(commands) = matches.get_many::<String>("COMMAND") else {
        return Ok(ExitCode::SUCCESS);
    };

    let socket_file = BaseDirectories::with_prefix("tilewm")?
        .find_runtime_file(SOCKET_NAME)
        .with_context(|| format!("couldn't find {SOCKET_NAME}, is tilewm running?"))?;
    let stream = UnixStream::connect(&socket_file)
        .await
        .with_context(|| format!("couldn't connect to {}", socket_file.display()))?;
    let (read, mut write) = stream.into_split();
    let mut replies = BufReader::new(read).lines();

    let mut exit_code = ExitCode::SUCCESS;
    for command in commands {
        write.write_all(format!("{command}\n").as_bytes()).await?;
        let line = replies
            .next_line()
            .await?
            .context("tilewm closed the connection")?;
        let Some(reply) = Reply::parse(&line) else {
            bail!("unexpected reply `{line}`");
        };
        if reply.status == 0 {
            if !reply.message.is_empty() {
                println!("{}", reply.message);
            }
        } else {
            eprintln!("{command}: {}", reply.message);
            exit_code = ExitCode::FAILURE;
        }
    }
    Ok(exit_code)
}

fn get_command() -> clap::Command {
    command!("tilewm command")
        .about("Sends commands to a running tilewm")
        .help_template(tilewm::utils::get_help_template())
        .args(&[
            arg!(-l --list "Print a list of available commands with their arguments."),
            arg!([COMMAND] ... "The command to be sent. See 'list' flag."),
        ])
}

fn print_commandlist() {
    println!(
        "
        Available Commands:

        reload                 Re-read the configuration and apply it
        validate               Check the configuration file without applying it

        FocusNext
        FocusPrevious
        IncreaseFactor
        DecreaseFactor
        IncreaseMaster
        DecreaseMaster
        ToggleFloating
        ToggleFullscreen
        ToggleLayoutMode
        CloseWindow
        Reload
        Quit

        Commands with arguments:
            Use quotations for the command and arguments, like this:
            tilewm-command \"<command> <args>\"

        SwitchWorkspace        Args: <workspace> (int, from 1)
        MoveToWorkspace        Args: <workspace> (int, from 1)
        Spawn                  Args: <program and arguments>
         "
    );
}
