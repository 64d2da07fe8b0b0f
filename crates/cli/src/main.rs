use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dphoto_renamer_core::{
    app_paths, apply_plan_with_options, generate_plan, load_config, ApplyOptions, PlanOptions,
};

#[derive(Debug, Parser)]
#[command(name = "dphoto-renamer-cli")]
#[command(about = "ファイル名に埋め込まれた日時で写真を一括リネームします")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    input: String,
    #[arg(long, default_value_t = false)]
    include_hidden: bool,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, default_value_t = false)]
    keep_file_times: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;

    let options = PlanOptions {
        input: args.input.into(),
        include_hidden: args.include_hidden || config.include_hidden_default,
    };

    let plan = generate_plan(&options)?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Table => {
            print_table(&plan);
        }
    }

    if args.apply {
        let apply_options = ApplyOptions {
            update_file_times: config.update_file_times && !args.keep_file_times,
        };
        let result = apply_plan_with_options(&plan, &apply_options)?;
        eprintln!(
            "適用完了: {}件 (変更なし {}件)",
            result.applied, result.unchanged
        );
    } else {
        eprintln!("dry-runモード: 実ファイルは変更していません。適用するには --apply を指定してください。");
    }

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_table(plan: &dphoto_renamer_core::RenamePlan) {
    println!("元ファイル -> 新ファイル");
    for candidate in &plan.candidates {
        println!(
            "{} -> {} ({})",
            candidate.original_path.display(),
            candidate.target_path.display(),
            candidate.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!(
        "\n集計: scanned={} matched={} no_timestamp_skip={} hidden_skip={} planned={} unchanged={}",
        plan.stats.scanned_files,
        plan.stats.matched_files,
        plan.stats.skipped_no_timestamp,
        plan.stats.skipped_hidden,
        plan.stats.planned,
        plan.stats.unchanged
    );
}
