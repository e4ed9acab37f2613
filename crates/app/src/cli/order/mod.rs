use clap::{Args, Subcommand};

mod show;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    Show(show::ShowOrderArgs),
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Show(args) => show::run(args).await,
    }
}
