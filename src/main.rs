use clap::Parser;
use upload_form::cli::commands::{SubmitArgs, cmd_render, cmd_submit};
use upload_form::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let succeeded = match cli.command {
        Commands::Submit {
            action,
            file,
            question,
            url,
            endpoint,
            format,
            output,
        } => {
            let args = SubmitArgs {
                action: &action,
                file: file.as_deref(),
                question: question.as_deref(),
                url: url.as_deref(),
                endpoint: endpoint.as_deref(),
                format: &format,
                output: output.as_deref(),
            };
            cmd_submit(&args, &config, cli.verbose)?
        }
        Commands::Render {
            input,
            format,
            output,
        } => cmd_render(&input, &format, output.as_deref(), &config, cli.verbose)?,
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
