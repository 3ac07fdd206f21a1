use anyhow::{bail, Context, Result};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tuxemon_db::{
    app::AppContext,
    cli::{Cli, Commands, TeamCommands},
    config::resolve_database,
    db::Database,
    filter::MonsterFilter,
    loader::load_directory,
    query::MonsterRow,
    schema::table_names,
    team::{TeamSelection, TeamStats},
    ui::{browser, ConsoleUi},
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_path = resolve_database(cli.database.as_deref())?;
    let mut db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    match cli.command {
        Commands::Init { reset } => {
            if reset {
                db.reset().context("Failed to reset schema")?;
            }
            println!("Schema ready in {:?}:", db_path);
            for name in table_names() {
                println!("  {}", name);
            }
        }

        Commands::Load { data_dir } => {
            let start = Instant::now();
            let mut ui = ConsoleUi::new();
            let summary = load_directory(&mut db, &data_dir, &mut ui)?;

            println!(
                "\nLoaded {} monsters into {:?} in {:.1}s ({} files skipped)",
                summary.monsters,
                db_path,
                start.elapsed().as_secs_f64(),
                summary.skipped
            );
        }

        Commands::List {
            types,
            tags,
            terrains,
        } => {
            let ctx = AppContext::new(db);
            let dataset = ctx.dataset()?;
            let filter = MonsterFilter::from_lists(types, tags, terrains);
            let rows = filter.apply(dataset.rows());

            println!("Showing {} of {} monsters\n", rows.len(), dataset.len());
            for row in rows {
                print_member(row);
            }
        }

        Commands::Show { slug } => {
            let ctx = AppContext::new(db);
            let dataset = ctx.dataset()?;
            let Some(monster) = dataset.by_slug(&slug) else {
                bail!("Unknown monster '{}'", slug);
            };
            let detail = ctx.detail(monster)?;

            println!("{}", monster.display_name());
            println!("  Category:   {}", monster.category);
            println!("  Shape:      {}", monster.shape);
            println!("  Stage:      {}", monster.stage);
            println!("  Height:     {} cm", monster.height);
            println!("  Weight:     {} kg", monster.weight);
            println!("  Catch Rate: {}", monster.catch_rate);
            println!("  Types:      {}", monster.types.join(", "));
            println!("  Tags:       {}", monster.tags.join(", "));
            println!("  Terrains:   {}", monster.terrains.join(", "));

            println!("\nMoveset:");
            for mv in &detail.moveset {
                println!("  Lv {:>3}  {}", mv.level_learned, mv.technique);
            }
            println!("\nEvolutions:");
            for (evo, target) in detail.resolved_evolutions(dataset) {
                let level = evo.at_level.map(|l| l.to_string()).unwrap_or_default();
                match target {
                    Some(target) => println!("  Lv {:>3}  {}", level, target.display_name()),
                    None => println!("  Lv {:>3}  {} (not loaded)", level, evo.evolves_to_slug),
                }
            }
            println!("\nHistory:");
            for h in &detail.history {
                println!("  {}  {}", h.evo_stage, h.mon_slug);
            }
        }

        Commands::Team { command } => {
            let ctx = AppContext::new(db);
            match command {
                TeamCommands::Save { name, members } => {
                    let selection = TeamSelection::from_slugs(members)?;
                    let team_id = ctx.save_team(&name, &selection)?;
                    println!("Team '{}' saved with id {}", name.trim(), team_id);
                    print_team(&selection.resolve(ctx.dataset()?)?);
                }
                TeamCommands::Show { id } => {
                    let members = ctx.load_team(id)?;
                    print_team(&members);
                }
                TeamCommands::List => {
                    for team in ctx.list_teams()? {
                        println!(
                            "{:>4}  {}  {}",
                            team.id,
                            team.created_at.format("%Y-%m-%d %H:%M:%S"),
                            team.team_name
                        );
                    }
                }
            }
        }

        Commands::Browse => {
            let ctx = AppContext::new(db);
            browser::run(&ctx)?;
        }
    }

    Ok(())
}

fn print_member(row: &MonsterRow) {
    println!("{} - {}", row.display_name(), row.types.join(", "));
}

fn print_team(members: &[&MonsterRow]) {
    if let Some(stats) = TeamStats::compute(members) {
        for (label, value) in stats.display_fields() {
            println!("{:<19} {}", format!("{}:", label), value);
        }
        println!();
    }
    for member in members {
        print_member(member);
    }
}
