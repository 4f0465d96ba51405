use anyhow::{bail, Context, Result};
use football_extract::{
    cli::{Cli, Commands},
    config::{validate_env_name, EnvConfig, EnvDefinition, StoreLayout},
    loader::load,
    sampler::{closure::dangling_references, create_env, EnvParams},
    schema::SchemaRegistry,
    store::{SqliteStore, TableStore},
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse_args();
    let registry = SchemaRegistry::football();

    match cli.command {
        Commands::Load { data_root } => {
            let start = Instant::now();
            let layout = StoreLayout::new(cli.store_dir)?;
            let mut store = SqliteStore::open(&layout.canonical_db())?;

            let summary = load(&data_root, &mut store, &registry)
                .with_context(|| format!("Failed to load raw data from {:?}", data_root))?;

            for (table, rows) in &summary.tables {
                println!("  {:<20} {}", table, rows);
            }
            println!(
                "\nCreated {:?} ({} rows) in {:.1}s",
                layout.canonical_db(),
                summary.total_rows(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::CreateEnv {
            config,
            name,
            seasons,
            match_fraction,
            value_fraction,
        } => {
            let envs = match (config, seasons, match_fraction) {
                (Some(path), _, _) => {
                    let config = EnvConfig::from_file(&path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    config.select(name.as_deref())?.into_iter().cloned().collect()
                }
                (None, Some(seasons), Some(match_fraction)) => {
                    let name = name.unwrap_or_else(|| "dev".to_string());
                    validate_env_name(&name)?;
                    vec![EnvDefinition {
                        name,
                        params: EnvParams::new(seasons, match_fraction, value_fraction),
                    }]
                }
                _ => bail!("Either --config or --seasons with --match-fraction is required"),
            };

            let layout = StoreLayout::new(cli.store_dir)?;
            let source = SqliteStore::open(&layout.canonical_db())?;

            for env in envs {
                let start = Instant::now();
                let mut dest = SqliteStore::open(&layout.env_db(&env.name))?;
                let summary = create_env(&source, &mut dest, &registry, &env.params)
                    .with_context(|| format!("Failed to create environment {}", env.name))?;

                println!("\nEnvironment {}:", env.name);
                for (table, rows) in &summary.tables {
                    println!("  {:<20} {}", table, rows);
                }
                if !summary.empty_tables.is_empty() {
                    println!("  empty: {}", summary.empty_tables.join(", "));
                }
                println!(
                    "Created {:?} in {:.1}s",
                    layout.env_db(&env.name),
                    start.elapsed().as_secs_f64()
                );
            }
        }

        Commands::Check { env, tables } => {
            let layout = StoreLayout::new(cli.store_dir)?;
            let path = match &env {
                Some(name) => {
                    if !layout.env_names()?.contains(name) {
                        bail!("Unknown environment: {}", name);
                    }
                    layout.env_db(name)
                }
                None => layout.canonical_db(),
            };
            let store = SqliteStore::open(&path)?;

            let schemas = match tables {
                Some(names) => {
                    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                    registry
                        .resolver()
                        .resolve_includes(&refs)
                        .map_err(anyhow::Error::msg)?
                }
                None => registry.write_order()?,
            };

            let loaded = schemas
                .into_iter()
                .map(|schema| store.read_full(schema))
                .collect::<football_extract::Result<Vec<_>>>()?;

            let report = dangling_references(&loaded);
            for d in &report {
                println!(
                    "  {}.{} -> {}: {} row(s), {} distinct value(s)",
                    d.table,
                    d.column,
                    d.target,
                    d.rows,
                    d.values.len()
                );
            }
            if !report.is_empty() {
                bail!("{} foreign key(s) do not resolve in {:?}", report.len(), path);
            }
            println!("All foreign keys resolve in {:?}", path);
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for table in registry.write_order()? {
                let key = if table.has_key() {
                    table.primary_key.join(", ")
                } else {
                    "-".to_string()
                };
                let dependents = registry.resolver().dependents(table.name);
                println!(
                    "  {:<20} key: {:<14} referenced by: {:?}",
                    table.name, key, dependents
                );
            }
        }
    }

    Ok(())
}
