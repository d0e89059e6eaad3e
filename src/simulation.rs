// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The queue simulation assigning every sound point of a sequence to a server.
//!
//! Sound points arrive at their instance and wait in a FIFO queue until a
//! server that is free and able to play them exists. The queue is scanned
//! front to back, so a waiting point that no free server can play does not
//! block later points that some free server can play. Time only moves forward,
//! either to the next arrival or to the next moment a busy server frees up.

use std::fmt;

use log::{debug, trace, warn};
use pang_core::{Sequence, SoundPoint, Time};
use snafu::Snafu;

use crate::server::Server;

/// Possible errors when simulating a queue.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum QueueError {
    #[snafu(display(
        "{} sound point(s) cannot be played by any server: {}",
        indices.len(),
        Unservable(sound_points)
    ))]
    NotServable {
        /// Positions of the offending sound points in the sequence.
        indices: Vec<usize>,
        sound_points: Vec<SoundPoint>,
    },
    /// All servers are free but refuse the remaining queued sound points,
    /// which only happens if `Server::can_serve` changed its answers during
    /// the simulation. The servers hold a partial result.
    #[snafu(display(
        "servers stopped accepting {} queued sound point(s) at {}",
        indices.len(),
        time
    ))]
    Stalled { indices: Vec<usize>, time: Time },
}

struct Unservable<'a>(&'a [SoundPoint]);

impl fmt::Display for Unservable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "pitch {} at {}", point.pitch(), point.instance())?;
        }
        Ok(())
    }
}

/// Distribute the sound points of `sequence` over `servers`.
///
/// Every sound point is played by exactly one server, never before its
/// instance. The servers are returned for convenience; their records hold the
/// result. If some sound point cannot be played by any server, nothing is
/// touched and `QueueError::NotServable` lists all such points.
///
/// Ties are broken towards the earlier queued sound point and then towards the
/// lower server index, so the outcome is fully determined by the inputs.
pub fn simulate_queue<'a, S: Server>(
    sequence: &Sequence,
    servers: &'a mut [S],
) -> Result<&'a mut [S], QueueError> {
    check_servable(sequence, servers)?;
    debug!(
        "simulating {} sound points on {} servers",
        sequence.len(),
        servers.len()
    );

    let mut simulation = Simulation {
        sound_points: sequence.sound_points(),
        servers: &mut *servers,
        pending: Vec::new(),
        now: Time::zero(),
        delayed: 0,
        total_wait: Time::zero(),
    };
    simulation.run()?;
    debug!(
        "{} sound points had to wait, {} seconds in total",
        simulation.delayed, simulation.total_wait
    );

    Ok(servers)
}

fn check_servable<S: Server>(sequence: &Sequence, servers: &[S]) -> Result<(), QueueError> {
    let indices: Vec<usize> = sequence
        .iter()
        .enumerate()
        .filter(|(_, point)| !servers.iter().any(|server| server.can_serve(point)))
        .map(|(index, _)| index)
        .collect();

    if indices.is_empty() {
        Ok(())
    } else {
        warn!("{} sound points match no server", indices.len());
        let sound_points = indices
            .iter()
            .map(|index| sequence.sound_points()[*index].clone())
            .collect();
        Err(QueueError::NotServable {
            indices,
            sound_points,
        })
    }
}

struct Simulation<'a, S> {
    sound_points: &'a [SoundPoint],
    servers: &'a mut [S],
    /// Indices of arrived but unplayed sound points, in arrival order.
    pending: Vec<usize>,
    /// Simulated time.
    now: Time,
    delayed: usize,
    total_wait: Time,
}

impl<S: Server> Simulation<'_, S> {
    fn run(&mut self) -> Result<(), QueueError> {
        for index in 0..self.sound_points.len() {
            let arrival = self.sound_points[index].instance();
            self.advance(Some(arrival))?;
            self.now = self.now.max(arrival);
            self.pending.push(index);
            self.drain();
        }
        self.advance(None)
    }

    /// Step from one server release to the next, draining the queue each
    /// time, until the queue is empty or the next release lies after `limit`.
    fn advance(&mut self, limit: Option<Time>) -> Result<(), QueueError> {
        while !self.pending.is_empty() {
            let next = match self.next_release() {
                Some(next) => next,
                None if limit.is_some() => break,
                None => {
                    warn!("{} sound points stuck in the queue", self.pending.len());
                    return Err(QueueError::Stalled {
                        indices: self.pending.clone(),
                        time: self.now,
                    });
                }
            };
            if limit.map_or(false, |limit| next > limit) {
                break;
            }
            trace!("advancing from {} to {}", self.now, next);
            self.now = next;
            self.drain();
        }
        Ok(())
    }

    fn drain(&mut self) {
        while self.try_serve() {}
    }

    /// Play the first queued sound point that a free server can play.
    /// Returns whether anything was played.
    fn try_serve(&mut self) -> bool {
        let sound_points = self.sound_points;
        let now = self.now;
        for position in 0..self.pending.len() {
            let point = &sound_points[self.pending[position]];
            let server = self
                .servers
                .iter()
                .position(|server| server.offset_instance() <= now && server.can_serve(point));
            if let Some(server) = server {
                if now > point.instance() {
                    self.delayed += 1;
                    self.total_wait += now - point.instance();
                }
                self.servers[server].serve(now, point);
                self.pending.remove(position);
                return true;
            }
        }
        false
    }

    /// The earliest time after now at which a busy server becomes free.
    fn next_release(&self) -> Option<Time> {
        let now = self.now;
        self.servers
            .iter()
            .map(|server| server.offset_instance())
            .filter(|offset| *offset > now)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use pang_core::Pitch;

    use super::*;
    use crate::server::{NoteServer, PitchServer, ServedEvent, ServerRecord};

    /// Notes the time of every serve, in call order, in a log shared by all
    /// servers of a run.
    struct Logged<S> {
        server: S,
        log: Rc<RefCell<Vec<Time>>>,
    }

    impl<S: Server> Server for Logged<S> {
        fn record(&self) -> &ServerRecord {
            self.server.record()
        }

        fn record_mut(&mut self) -> &mut ServerRecord {
            self.server.record_mut()
        }

        fn can_serve(&self, sound_point: &SoundPoint) -> bool {
            self.server.can_serve(sound_point)
        }

        fn serve(&mut self, current_time: Time, sound_point: &SoundPoint) {
            self.log.borrow_mut().push(current_time);
            self.server.serve(current_time, sound_point)
        }
    }

    /// Simulate and return the servers along with all serve times in the
    /// order the serves happened.
    fn simulate_logged<S: Server>(
        sequence: &Sequence,
        servers: Vec<S>,
    ) -> (Vec<Logged<S>>, Vec<Time>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut servers: Vec<_> = servers
            .into_iter()
            .map(|server| Logged {
                server,
                log: Rc::clone(&log),
            })
            .collect();
        simulate_queue(sequence, &mut servers[..]).unwrap();
        let serve_times = log.borrow().clone();
        (servers, serve_times)
    }

    fn assert_non_decreasing(serve_times: &[Time]) {
        assert!(
            serve_times.windows(2).all(|pair| pair[0] <= pair[1]),
            "{:?}",
            serve_times
        );
    }

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    fn times(list: &[&str]) -> Vec<Time> {
        list.iter().map(|s| t(s)).collect()
    }

    fn pitches(list: &[Option<i32>]) -> Vec<Option<Pitch>> {
        list.iter().map(|p| p.map(Pitch::from)).collect()
    }

    fn sequence(instances: &[&str], durations: &[&str], pitches: &[i32], duration: &str) -> Sequence {
        let points = instances
            .iter()
            .zip(durations)
            .zip(pitches)
            .map(|((i, d), p)| SoundPoint::new(t(i), t(d), *p))
            .collect();
        Sequence::new(points, t(duration)).unwrap()
    }

    fn uniform(instances: &[&str], durations: &[&str], duration: &str) -> Sequence {
        sequence(instances, durations, &vec![0; instances.len()], duration)
    }

    /// Every sound point is played exactly once, never early, and each
    /// server's clock equals the sum of what it recorded.
    fn assert_consistent<S: Server>(sequence: &Sequence, servers: &[S]) {
        let mut counts: HashMap<&SoundPoint, isize> = HashMap::new();
        for point in sequence {
            *counts.entry(point).or_default() += 1;
        }
        for server in servers {
            let record = server.record();
            for point in record.served_sound_points() {
                *counts.entry(point).or_default() -= 1;
            }
            let total: Time = record.durations().iter().sum();
            assert_eq!(total, record.offset_instance());
            for event in record.events() {
                if let ServedEvent::Sound { start, sound_point } = event {
                    assert!(*start >= sound_point.instance());
                    assert!(server.can_serve(sound_point));
                }
            }
        }
        assert!(counts.values().all(|count| *count == 0), "{:?}", counts);
    }

    #[test]
    fn evenly_spaced_single_server() {
        let sequence = uniform(
            &["0", "1", "2", "3", "4"],
            &["0.5", "0.5", "0.5", "0.5", "0.5"],
            "10",
        );
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        let record = servers[0].record();
        assert_eq!(record.durations(), times(&["0.5"; 9]));
        assert_eq!(
            record.pitches(),
            pitches(&[Some(0), None, Some(0), None, Some(0), None, Some(0), None, Some(0)])
        );
        assert_consistent(&sequence, &servers);
    }

    #[test]
    fn overlap_forces_queueing() {
        let sequence = uniform(
            &["0", "1", "2", "3", "4"],
            &["2.1", "0.5", "0.5", "0.5", "0.5"],
            "10",
        );
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        let record = servers[0].record();
        assert_eq!(
            record.durations(),
            times(&["2.1", "0.5", "0.5", "0.5", "0.4", "0.5"])
        );
        assert_eq!(
            record.pitches(),
            pitches(&[Some(0), Some(0), Some(0), Some(0), None, Some(0)])
        );
        assert_consistent(&sequence, &servers);
    }

    #[test]
    fn late_start_gets_leading_silence() {
        let sequence = uniform(
            &["1", "2", "3", "4"],
            &["0.5", "0.5", "0.5", "0.5"],
            "5",
        );
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        let record = servers[0].record();
        assert_eq!(
            record.durations(),
            times(&["1", "0.5", "0.5", "0.5", "0.5", "0.5", "0.5", "0.5"])
        );
        assert_eq!(
            record.pitches(),
            pitches(&[None, Some(0), None, Some(0), None, Some(0), None, Some(0)])
        );
    }

    #[test]
    fn late_start_with_queueing() {
        let sequence = uniform(
            &["1", "2", "3", "4", "5"],
            &["2.1", "0.5", "0.5", "0.5", "0.5"],
            "6",
        );
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        let record = servers[0].record();
        assert_eq!(
            record.durations(),
            times(&["1", "2.1", "0.5", "0.5", "0.5", "0.4", "0.5"])
        );
        assert_eq!(
            record.pitches(),
            pitches(&[None, Some(0), Some(0), Some(0), Some(0), None, Some(0)])
        );
    }

    #[test]
    fn dense_arrivals_play_back_to_back() {
        let instances = ["1", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9"];
        let sequence = uniform(&instances, &["0.5"; 10], "10");
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        let record = servers[0].record();
        let mut expected = times(&["1"]);
        expected.extend(times(&["0.5"; 10]));
        assert_eq!(record.durations(), expected);
        assert_eq!(record.pitches()[0], None);
        assert!(record.pitches()[1..].iter().all(Option::is_some));
        assert_eq!(record.offset_instance(), Time::int(6));
    }

    #[test]
    fn heterogeneous_servers_serve_out_of_arrival_order() {
        let sequence = sequence(
            &["0", "1", "2", "3"],
            &["2.5", "0.5", "0.5", "0.5"],
            &[0, 0, 1, 1],
            "4",
        );
        let (servers, serve_times) = simulate_logged(
            &sequence,
            vec![PitchServer::new(vec![0]), PitchServer::new(vec![1])],
        );

        // the pitch 1 points go first although they arrived later
        assert_eq!(serve_times, times(&["0", "2", "2.5", "3"]));
        assert_eq!(servers[0].record().durations(), times(&["2.5", "0.5"]));
        assert_eq!(servers[0].record().pitches(), pitches(&[Some(0), Some(0)]));
        assert_eq!(
            servers[1].record().durations(),
            times(&["2", "0.5", "0.5", "0.5"])
        );
        assert_eq!(
            servers[1].record().pitches(),
            pitches(&[None, Some(1), None, Some(1)])
        );
        assert_consistent(&sequence, &servers);
    }

    #[test]
    fn unservable_fails_before_touching_servers() {
        let sequence = sequence(&["0", "1"], &["1", "1"], &[0, 1], "2");
        let mut servers = [PitchServer::new(vec![0])];
        let result = simulate_queue(&sequence, &mut servers);

        assert_eq!(
            result.unwrap_err(),
            QueueError::NotServable {
                indices: vec![1],
                sound_points: vec![sequence.sound_points()[1].clone()],
            }
        );
        assert!(servers[0].record().is_empty());
        assert_eq!(servers[0].offset_instance(), Time::zero());
    }

    #[test]
    fn changing_minds_stalls_the_queue() {
        use std::cell::Cell;

        use crate::server::PredicateServer;

        // accepts only when asked the first time
        let asked = Cell::new(0);
        let mut servers = [PredicateServer::new(|_: &SoundPoint| {
            asked.set(asked.get() + 1);
            asked.get() == 1
        })];
        let sequence = uniform(&["1"], &["1"], "2");
        assert_eq!(
            simulate_queue(&sequence, &mut servers).unwrap_err(),
            QueueError::Stalled {
                indices: vec![0],
                time: Time::one(),
            }
        );
    }

    #[test]
    fn no_servers_cannot_serve_anything() {
        let sequence = uniform(&["0"], &["1"], "1");
        let mut servers: [NoteServer; 0] = [];
        let error = simulate_queue(&sequence, &mut servers).unwrap_err();
        assert_eq!(
            error.to_string(),
            "1 sound point(s) cannot be played by any server: pitch 0 at 0"
        );
    }

    #[test]
    fn empty_sequence_is_a_no_op() {
        let mut servers = [NoteServer::new(), NoteServer::new()];
        simulate_queue(&Sequence::empty(), &mut servers).unwrap();
        assert!(servers.iter().all(|server| server.record().is_empty()));
    }

    #[test]
    fn overlapping_points_spread_over_servers() {
        let sequence = uniform(&["0", "0.5", "1"], &["1", "1", "1"], "2");
        let mut servers = [NoteServer::new(), NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();

        assert_eq!(servers[0].record().durations(), times(&["1", "1"]));
        assert_eq!(servers[1].record().durations(), times(&["0.5", "1"]));
        assert_eq!(servers[1].record().pitches(), pitches(&[None, Some(0)]));
        assert_consistent(&sequence, &servers);
    }

    #[test]
    fn simultaneous_arrival_goes_to_lowest_index() {
        let sequence = uniform(&["0"], &["1"], "1");
        let mut servers = [NoteServer::new(), NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();
        assert!(!servers[0].record().is_empty());
        assert!(servers[1].record().is_empty());
    }

    #[test]
    fn waiting_point_keeps_priority_at_release() {
        // The first point occupies the server until 2; the second arrives at 1
        // and waits; the third arrives exactly at 2. The waiting one goes first.
        let sequence = sequence(&["0", "1", "2"], &["2", "1", "1"], &[0, 1, 2], "3");
        let mut servers = [NoteServer::new()];
        simulate_queue(&sequence, &mut servers).unwrap();
        assert_eq!(
            servers[0].record().pitches(),
            pitches(&[Some(0), Some(1), Some(2)])
        );
        assert_eq!(servers[0].offset_instance(), Time::int(4));
    }

    #[test]
    fn deterministic_and_consistent_under_load() {
        // A dense, irregular sequence over three servers with overlapping
        // pitch capabilities.
        let mut points = Vec::new();
        let mut state: i64 = 17;
        let mut instance = Time::zero();
        for _ in 0..200 {
            state = (state * 1103 + 12345) % 10007;
            instance += Time::new(state % 7, 10);
            let duration = Time::new(state % 13 + 1, 10);
            let pitch = (state % 4) as i32;
            points.push(SoundPoint::new(instance, duration, pitch));
        }
        let sequence = Sequence::from_sound_points(points).unwrap();

        let run_servers = || {
            vec![
                PitchServer::new(vec![0, 1]),
                PitchServer::new(vec![1, 2]),
                PitchServer::new(vec![2, 3, 0]),
            ]
        };
        let run = || {
            let mut servers = run_servers();
            simulate_queue(&sequence, &mut servers).unwrap();
            servers
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_consistent(&sequence, &first);

        let (logged, serve_times) = simulate_logged(&sequence, run_servers());
        assert_eq!(serve_times.len(), sequence.len());
        assert_non_decreasing(&serve_times);
        for (logged, plain) in logged.iter().zip(&first) {
            assert_eq!(logged.record(), plain.record());
        }
    }
}
