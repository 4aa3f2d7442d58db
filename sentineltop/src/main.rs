//! Entry point for the sentineltop TUI. Parses args and runs the App.

use sentineltop::app::App;
use sentineltop::cache::{cache_path, SnapshotCache};
use sentineltop::config::load_settings;
use sentineltop::profiles::{
    load_profiles, profiles_path, save_decision, save_profiles, ProfileEntry, ProfileRequest,
    ProfilesFile, ResolveProfile, SaveDecision,
};
use sentineltop::{logging, ApiClient, MetricsPoller};
use std::env;
use std::io::{self, Write};
use std::time::Instant;

const USAGE_ARGS: &str = "[--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--interval SECS|-i SECS] [--dry-run] [http://HOST:PORT]";

#[derive(Debug, Default)]
struct ParsedArgs {
    url: Option<String>,
    tls_ca: Option<String>,
    profile: Option<String>,
    interval: Option<u64>,
    save: bool,
    dry_run: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sentineltop".into());
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!("Usage: {prog} {USAGE_ARGS}"));
            }
            "--tls-ca" | "-t" => {
                parsed.tls_ca = it.next();
            }
            "--profile" | "-P" => {
                parsed.profile = it.next();
            }
            "--interval" | "-i" => {
                parsed.interval = Some(parse_interval(it.next().as_deref(), &prog)?);
            }
            "--save" => {
                parsed.save = true;
            }
            "--dry-run" => {
                parsed.dry_run = true;
            }
            _ if arg.starts_with("--tls-ca=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.tls_ca = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--interval=") => {
                let v = arg.split_once('=').map(|(_, v)| v);
                parsed.interval = Some(parse_interval(v, &prog)?);
            }
            _ => {
                if parsed.url.is_none() {
                    parsed.url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. Usage: {prog} {USAGE_ARGS}"));
                }
            }
        }
    }
    Ok(parsed)
}

fn parse_interval(v: Option<&str>, prog: &str) -> Result<u64, String> {
    v.and_then(|s| s.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .ok_or_else(|| format!("--interval expects a positive number of seconds. Usage: {prog} {USAGE_ARGS}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    // Runs before logging is up, so problems go to stderr.
    let profiles_file = load_profiles().unwrap_or_else(|e| {
        eprintln!(
            "warning: ignoring malformed profiles file {}: {e}",
            profiles_path().display()
        );
        ProfilesFile::default()
    });
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
    };
    let resolved = req.resolve(&profiles_file);

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let (url, tls_ca): (String, Option<String>) = match resolved {
        ResolveProfile::Direct(u, t) => {
            if let Some(name) = parsed.profile.as_ref() {
                let entry = ProfileEntry {
                    url: u.clone(),
                    tls_ca: t.clone(),
                };
                let write = match save_decision(&profiles_mut, name, &entry) {
                    SaveDecision::Create => true,
                    SaveDecision::Unchanged => false,
                    SaveDecision::Changed => {
                        parsed.save
                            || prompt_yes_no(&format!(
                                "Overwrite existing profile '{name}'? [y/N]: "
                            ))
                    }
                };
                if write {
                    persist_profile(&mut profiles_mut, name, entry);
                }
            }
            (u, t)
        }
        ResolveProfile::Loaded(u, t) => (u, t),
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|i| names.get(i))
                .and_then(|name| profiles_mut.profiles.get(name));
            match picked {
                Some(entry) => (entry.url.clone(), entry.tls_ca.clone()),
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter API base URL (http://HOST:PORT or https://...): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let ca_opt = if ca.trim().is_empty() {
                None
            } else {
                Some(ca.trim().to_string())
            };
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                tls_ca: ca_opt.clone(),
            };
            persist_profile(&mut profiles_mut, &name, entry);
            (url.trim().to_string(), ca_opt)
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(());
        }
    };

    if parsed.dry_run {
        println!("url: {url}");
        if let Some(ca) = tls_ca.as_deref() {
            println!("tls-ca: {ca}");
        }
        return Ok(());
    }

    let log_path = logging::init(None)?;
    let mut settings = load_settings();
    if let Some(secs) = parsed.interval {
        settings.refresh_interval_secs = secs;
    }
    tracing::info!(%url, log = %log_path.display(), ?settings, "starting");

    let client = ApiClient::new(&url, settings.request_timeout(), tls_ca.as_deref())?;
    let base = client.base().to_string();
    let cache = if settings.persist_cache {
        SnapshotCache::open(cache_path())
    } else {
        SnapshotCache::new()
    };
    let poller = MetricsPoller::new(client, settings, cache, Instant::now());
    let mut app = App::new(poller, base);
    let res = app.run().await;
    if let Err(e) = res.as_ref() {
        tracing::error!(error = %e, "exiting with error");
    }
    res
}

fn persist_profile(profiles: &mut ProfilesFile, name: &str, entry: ProfileEntry) {
    profiles.profiles.insert(name.to_string(), entry);
    if let Err(e) = save_profiles(profiles) {
        eprintln!("warning: could not save profile '{name}': {e}");
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
