// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, info, Level};

use chordially::config::{validate_config, AppConfig, ConfigEvent, ConfigWatcher};
use chordially::music::{self, voice, Derivation, Progression, ScaleType};
use chordially::playback::{LogBackend, Player};
use chordially::recording::{render_into, MidiExporter, MidiFileFormat};
use chordially::server::QueryServer;

fn print_usage() {
    println!("CHORDIALLY - Diatonic Chord Explorer");
    println!();
    println!("Usage: chordially [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  show [ROOT] [SCALE]          Print the scale and its seven chords");
    println!("  play [ROOT] [SCALE]          Play the chords (all seven, or a progression)");
    println!("  export <FILE> [ROOT] [SCALE] Render the chords to a MIDI file");
    println!("  serve                        Run the JSON query service");
    println!("  watch <FILE>                 Re-derive whenever a config file changes");
    println!();
    println!("Options:");
    println!("  --config <FILE>              Load settings from a YAML or TOML file");
    println!("  --ext <E>                    Chord size: triad, seventh, ninth");
    println!("  --style <S>                  Play style: sustained, arpeggiated, strummed");
    println!("  --instrument <I>             Synth, AMSynth, FMSynth, DuoSynth, PluckSynth");
    println!("  --progression <P>            Named progression or numerals, e.g. I-V-vi-IV");
    println!("  --ppqn <N>                   MIDI export resolution (default 480)");
    println!("  --midi-type <0|1>            MIDI file type for export (default 0)");
    println!("  --verbose                    Show debug logging");
    println!("  --help                       Show this help message");
    println!();
    println!("Progressions: {}", Progression::available().join(", "));
}

/// Parsed command line
#[derive(Debug, Default)]
struct Cli {
    command: Option<String>,
    positional: Vec<String>,
    config: Option<PathBuf>,
    extension: Option<String>,
    style: Option<String>,
    instrument: Option<String>,
    progression: Option<String>,
    ppqn: Option<String>,
    midi_type: Option<String>,
    verbose: bool,
    help: bool,
}

impl Cli {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cli = Cli::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{} requires a value", flag))
            };
            match arg.as_str() {
                "--help" | "-h" => cli.help = true,
                "--verbose" | "-v" => cli.verbose = true,
                "--config" => cli.config = Some(PathBuf::from(value(arg.as_str())?)),
                "--ext" => cli.extension = Some(value(arg.as_str())?),
                "--style" => cli.style = Some(value(arg.as_str())?),
                "--instrument" => cli.instrument = Some(value(arg.as_str())?),
                "--progression" => cli.progression = Some(value(arg.as_str())?),
                "--ppqn" => cli.ppqn = Some(value(arg.as_str())?),
                "--midi-type" => cli.midi_type = Some(value(arg.as_str())?),
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                _ if cli.command.is_none() => cli.command = Some(arg.clone()),
                _ => cli.positional.push(arg.clone()),
            }
        }
        Ok(cli)
    }

    /// Base configuration from `--config`, or defaults
    fn load_config(&self) -> Result<AppConfig> {
        match &self.config {
            Some(path) => AppConfig::load(path),
            None => Ok(AppConfig::default()),
        }
    }

    /// Apply `[ROOT] [SCALE]` positionals (starting at `skip`) and flags
    fn apply(&self, config: &mut AppConfig, skip: usize) -> Result<()> {
        let mut rest = self.positional.iter().skip(skip);
        if let Some(root) = rest.next() {
            config.player.root = root.clone();
        }
        if let Some(scale) = rest.next() {
            config.player.scale = scale.parse::<ScaleType>()?;
        }
        if let Some(ext) = &self.extension {
            config.player.extension = ext.parse()?;
        }
        if let Some(style) = &self.style {
            config.player.style = style.parse()?;
        }
        if let Some(instrument) = &self.instrument {
            config.player.instrument = instrument.parse()?;
        }
        Ok(())
    }

    fn progression(&self, chord_count: usize) -> Result<Progression> {
        match &self.progression {
            Some(p) => Ok(p.parse()?),
            None => Ok(Progression::scale_order(chord_count)),
        }
    }

    /// Empty exporter configured from `--ppqn` and `--midi-type`
    fn exporter(&self) -> Result<MidiExporter> {
        let mut exporter = MidiExporter::new();
        if let Some(ppqn) = &self.ppqn {
            let ppqn: u16 = ppqn
                .parse()
                .map_err(|_| anyhow!("Invalid PPQN: {}", ppqn))?;
            exporter.set_ppqn(ppqn);
        }
        match self.midi_type.as_deref() {
            None | Some("0") => exporter.set_format(MidiFileFormat::Type0),
            Some("1") => exporter.set_format(MidiFileFormat::Type1),
            Some(other) => bail!("Invalid MIDI file type: {}", other),
        }
        Ok(exporter)
    }
}

fn print_derivation(derivation: &Derivation) {
    let scale = &derivation.scale;
    println!("{} ({:?} spelling)", scale, scale.spelling());
    println!("Notes: {}", scale.note_names().join(" "));
    println!();
    for (i, chord) in derivation.chords.iter().enumerate() {
        println!(
            "  {:<4} {:<8} {:<24} {}",
            chord.numeral(),
            derivation.symbol(i).unwrap_or_default(),
            chord.to_string(),
            voice(chord)
        );
    }
}

fn show(cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    cli.apply(&mut config, 0)?;
    let derivation = music::derive(&config.player)?;
    print_derivation(&derivation);
    Ok(())
}

fn play(cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    cli.apply(&mut config, 0)?;
    let derivation = music::derive(&config.player)?;
    let progression = cli.progression(derivation.chords.len())?;
    print_derivation(&derivation);

    let player = Player::new(Arc::new(LogBackend), config.timing.clone());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start playback runtime")?;
    runtime.block_on(player.play_progression(
        &derivation.chords,
        &progression,
        config.player.style,
        config.player.instrument,
    ))?;
    Ok(())
}

fn export(cli: &Cli) -> Result<()> {
    let path = cli
        .positional
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("export requires an output file"))?;
    let mut config = cli.load_config()?;
    cli.apply(&mut config, 1)?;
    let derivation = music::derive(&config.player)?;
    let progression = cli.progression(derivation.chords.len())?;

    let ordered = progression.resolve(&derivation.chords)?;
    let mut exporter = cli.exporter()?;
    render_into(
        &mut exporter,
        &ordered,
        config.player.style,
        config.player.instrument,
        &config.timing,
    );
    exporter
        .export(&path)
        .with_context(|| format!("Failed to write MIDI file: {:?}", path))?;
    println!(
        "Wrote {} chords of {} to {}",
        ordered.len(),
        derivation.scale,
        path.display()
    );
    Ok(())
}

fn serve(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let server = QueryServer::bind(&config.server)?;
    println!("Listening on http://{}/scale", config.server.address());
    server.run()
}

fn watch(cli: &Cli) -> Result<()> {
    let path = cli
        .positional
        .first()
        .map(PathBuf::from)
        .or_else(|| cli.config.clone())
        .ok_or_else(|| anyhow!("watch requires a config file"))?;

    let config = validate_config(&path)?;
    print_derivation(&music::derive(&config.player)?);

    let watcher = ConfigWatcher::new(&path, None)?;
    info!(path = ?watcher.watched_path(), "watching for changes (Ctrl+C to stop)");
    while let Some(event) = watcher.recv() {
        match event {
            ConfigEvent::Reloaded(config) => match music::derive(&config.player) {
                Ok(derivation) => {
                    println!();
                    print_derivation(&derivation);
                }
                Err(e) => error!(error = %e, "configuration rejected"),
            },
            ConfigEvent::Error(message) => error!("{}", message),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = Cli::parse(&args)?;

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if cli.help {
        print_usage();
        return Ok(());
    }

    match cli.command.as_deref() {
        None => {
            println!("CHORDIALLY - Diatonic Chord Explorer");
            println!("Run with --help for usage information");
        }
        Some("show") => show(&cli)?,
        Some("play") => play(&cli)?,
        Some("export") => export(&cli)?,
        Some("serve") => serve(&cli)?,
        Some("watch") => watch(&cli)?,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
