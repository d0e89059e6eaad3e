// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `pangc` distributes sound points over servers and optionally quantizes
//! the result into voices.

use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use log::info;
use simple_logger;
use structopt::StructOpt;

use pang::input;
use pang::mapper::{populate_voices_from_sequence, Voice, VoiceSpecification};
use pang::quantize::{GraceHandling, GridQuantizer, QuantizeConfig};
use pang::server::{NoteServer, PitchServer, ServedEvent, Server};
use pang::simulation::simulate_queue;
use pang_core::nonnan::ParseNonNanError;
use pang_core::{Pitch, Time};

#[derive(Debug, StructOpt)]
#[structopt(name = "pangc", about = "Turning sound points into voices")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// File with one sound point per line: instance, duration, pitch and attachments.
    #[structopt(parse(from_os_str))]
    source: PathBuf,

    /// Duration of the sequence in seconds. Defaults to the end of the last sound point.
    #[structopt(short, long)]
    duration: Option<Time>,

    /// Number of servers playing any pitch. Defaults to one if no pitch servers are given.
    #[structopt(short, long)]
    servers: Option<usize>,

    /// Add a server playing only the given comma separated pitches. May be repeated.
    #[structopt(short, long)]
    pitch_server: Vec<PitchSet>,

    /// Quantize every server into a voice instead of printing the raw records.
    #[structopt(short, long)]
    quantize: bool,

    /// Quarter notes per minute when quantizing.
    #[structopt(long, default_value = "60")]
    tempo: i64,

    /// Grid steps per quarter note when quantizing.
    #[structopt(long, default_value = "4")]
    divisions: i64,

    /// Drop events too short for the grid instead of turning them into grace notes.
    #[structopt(long)]
    discard_graces: bool,
}

#[derive(Debug)]
struct PitchSet(Vec<Pitch>);

impl FromStr for PitchSet {
    type Err = ParseNonNanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| part.trim().parse().map(Pitch::Note))
            .collect::<Result<_, _>>()
            .map(PitchSet)
    }
}

fn invalid_data(error: impl Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error.to_string())
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).unwrap();

    let source = std::fs::read_to_string(&opt.source)?;
    let sequence = input::parse_sequence(&source, opt.duration).map_err(invalid_data)?;
    info!(
        "read {} sound points spanning {} seconds",
        sequence.len(),
        sequence.sequence_duration()
    );

    let note_servers = opt
        .servers
        .unwrap_or(if opt.pitch_server.is_empty() { 1 } else { 0 });
    let mut servers: Vec<Box<dyn Server>> = Vec::new();
    for _ in 0..note_servers {
        servers.push(Box::new(NoteServer::new()));
    }
    for PitchSet(pitches) in opt.pitch_server {
        servers.push(Box::new(PitchServer::new(pitches)));
    }

    if !opt.quantize {
        simulate_queue(&sequence, &mut servers[..]).map_err(invalid_data)?;
        for (index, server) in servers.iter().enumerate() {
            println!("server {} (free at {}):", index, server.offset_instance());
            for event in server.record().events() {
                match event {
                    ServedEvent::Silence { duration } => println!("    rest {}", duration),
                    ServedEvent::Sound { start, sound_point } => {
                        print!("    {} {} {}", start, sound_point.pitch(), sound_point.duration());
                        for attachment in sound_point.attachments() {
                            print!(" {}", attachment);
                        }
                        println!();
                    }
                }
            }
        }
        return Ok(());
    }

    let mut config = QuantizeConfig::default();
    config.schema.tempo.units_per_minute = opt.tempo;
    config.schema.beat_divisions = opt.divisions;
    if opt.discard_graces {
        config.grace_handling = GraceHandling::Discard;
    }

    let mut voices: Vec<Voice> = (0..servers.len())
        .map(|index| Voice::new(format!("voice{}", index)))
        .collect();
    let mut specifications: Vec<VoiceSpecification> = voices
        .iter_mut()
        .zip(servers)
        .map(|(voice, server)| VoiceSpecification {
            voice,
            server,
            config: config.clone(),
        })
        .collect();
    let metadata = populate_voices_from_sequence(
        &sequence,
        &mut specifications,
        &mut GridQuantizer::new(),
    )
    .map_err(invalid_data)?;
    drop(specifications);

    for voice in &voices {
        println!("{}", voice);
    }
    info!(
        "discarded {} events, {} of them pitched",
        metadata.number_of_all_discarded_q_events, metadata.number_of_discarded_pitched_q_events
    );
    Ok(())
}
