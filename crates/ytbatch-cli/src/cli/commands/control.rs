//! `ytbatch pause|resume|stop` – signal the active batch run.

use anyhow::Result;

use crate::cli::control_socket::{self, ControlCommand};

pub async fn run_control(cmd: ControlCommand) -> Result<()> {
    let path = ytbatch_core::control::default_control_socket_path()?;
    control_socket::send_command(&path, cmd).await?;
    println!("Sent {} to active batch", cmd.as_str());
    Ok(())
}
