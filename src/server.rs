// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Servers are output channels that play sound points one after another.
//!
//! A server keeps a record of what it played and when it becomes free again
//! (its offset instance). Gaps between sound points are recorded as explicit
//! silences, so the record read front to back is a complete, gapless voice.

use std::fmt;

use pang_core::{Attachment, Pitch, Rational, SoundPoint, Time};

/// One entry of a server's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServedEvent {
    /// Nothing was played for `duration`.
    Silence { duration: Time },
    /// `sound_point` was played from `start`, which is later than its
    /// instance if the sound point had to wait in the queue.
    Sound { start: Time, sound_point: SoundPoint },
}

impl ServedEvent {
    pub fn duration(&self) -> Time {
        match self {
            ServedEvent::Silence { duration } => *duration,
            ServedEvent::Sound { sound_point, .. } => sound_point.duration(),
        }
    }

    /// `None` for silences.
    pub fn pitch(&self) -> Option<&Pitch> {
        match self {
            ServedEvent::Silence { .. } => None,
            ServedEvent::Sound { sound_point, .. } => Some(sound_point.pitch()),
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        match self {
            ServedEvent::Silence { .. } => &[],
            ServedEvent::Sound { sound_point, .. } => sound_point.attachments(),
        }
    }
}

/// An event handed to a quantizer: a duration in the quantizer's time unit,
/// a pitch (`None` is a rest), and the attachments to carry into notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QEvent {
    pub duration: Rational,
    pub pitch: Option<Pitch>,
    pub attachments: Vec<Attachment>,
}

/// Everything a server has played so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRecord {
    events: Vec<ServedEvent>,
    /// Sum of the durations of all events.
    offset_instance: Time,
}

impl ServerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `sound_point` starting at `current_time`.
    ///
    /// The caller guarantees `current_time >= self.offset_instance()`. Any gap
    /// before `current_time` is recorded as a silence.
    pub fn serve(&mut self, current_time: Time, sound_point: &SoundPoint) {
        if current_time > self.offset_instance {
            self.events.push(ServedEvent::Silence {
                duration: current_time - self.offset_instance,
            });
        }
        log::trace!(
            "serving pitch {} at {} (arrived {}) for {}",
            sound_point.pitch(),
            current_time,
            sound_point.instance(),
            sound_point.duration()
        );
        self.events.push(ServedEvent::Sound {
            start: current_time,
            sound_point: sound_point.clone(),
        });
        self.offset_instance = current_time + sound_point.duration();
    }

    /// The time at which the server is free for the next sound point.
    pub fn offset_instance(&self) -> Time {
        self.offset_instance
    }

    pub fn events(&self) -> &[ServedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn durations(&self) -> Vec<Time> {
        self.events.iter().map(ServedEvent::duration).collect()
    }

    /// Pitches in order, `None` for silences.
    pub fn pitches(&self) -> Vec<Option<Pitch>> {
        self.events
            .iter()
            .map(|event| event.pitch().cloned())
            .collect()
    }

    /// The sound points played, in the order they were played.
    pub fn served_sound_points(&self) -> impl Iterator<Item = &SoundPoint> + '_ {
        self.events.iter().filter_map(|event| match event {
            ServedEvent::Sound { sound_point, .. } => Some(sound_point),
            ServedEvent::Silence { .. } => None,
        })
    }

    /// The record as quantizer events, with durations multiplied by `unit`
    /// (the number of quantizer time units per second).
    pub fn q_events(&self, unit: Rational) -> Vec<QEvent> {
        self.events
            .iter()
            .map(|event| QEvent {
                duration: event.duration() * unit,
                pitch: event.pitch().cloned(),
                attachments: event.attachments().to_vec(),
            })
            .collect()
    }

    /// The record as quantizer events with durations in milliseconds.
    pub fn millisecond_q_events(&self) -> Vec<QEvent> {
        self.q_events(Rational::int(1000))
    }
}

/// An output channel for the queue simulation.
///
/// Implementors only provide access to their record and, optionally, a
/// servability predicate. Routing sound points to different voices is done
/// entirely through `can_serve`.
pub trait Server {
    fn record(&self) -> &ServerRecord;

    fn record_mut(&mut self) -> &mut ServerRecord;

    /// Whether this server may ever play `sound_point`.
    ///
    /// The answer must not change while a simulation runs, since the
    /// simulation checks servability up front. A server that changes its
    /// mind makes `simulate_queue` fail with `QueueError::Stalled`.
    fn can_serve(&self, _sound_point: &SoundPoint) -> bool {
        true
    }

    fn offset_instance(&self) -> Time {
        self.record().offset_instance()
    }

    fn serve(&mut self, current_time: Time, sound_point: &SoundPoint) {
        self.record_mut().serve(current_time, sound_point)
    }
}

impl<S: Server + ?Sized> Server for Box<S> {
    fn record(&self) -> &ServerRecord {
        (**self).record()
    }

    fn record_mut(&mut self) -> &mut ServerRecord {
        (**self).record_mut()
    }

    fn can_serve(&self, sound_point: &SoundPoint) -> bool {
        (**self).can_serve(sound_point)
    }

    fn offset_instance(&self) -> Time {
        (**self).offset_instance()
    }

    fn serve(&mut self, current_time: Time, sound_point: &SoundPoint) {
        (**self).serve(current_time, sound_point)
    }
}

impl<S: Server + ?Sized> Server for &mut S {
    fn record(&self) -> &ServerRecord {
        (**self).record()
    }

    fn record_mut(&mut self) -> &mut ServerRecord {
        (**self).record_mut()
    }

    fn can_serve(&self, sound_point: &SoundPoint) -> bool {
        (**self).can_serve(sound_point)
    }

    fn offset_instance(&self) -> Time {
        (**self).offset_instance()
    }

    fn serve(&mut self, current_time: Time, sound_point: &SoundPoint) {
        (**self).serve(current_time, sound_point)
    }
}

/// Plays anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteServer {
    record: ServerRecord,
}

impl NoteServer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Server for NoteServer {
    fn record(&self) -> &ServerRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ServerRecord {
        &mut self.record
    }
}

/// Plays only sound points whose pitch is one of a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchServer {
    pitches: Vec<Pitch>,
    record: ServerRecord,
}

impl PitchServer {
    pub fn new<I, P>(pitches: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pitch>,
    {
        PitchServer {
            pitches: pitches.into_iter().map(Into::into).collect(),
            record: ServerRecord::new(),
        }
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }
}

impl Server for PitchServer {
    fn record(&self) -> &ServerRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ServerRecord {
        &mut self.record
    }

    fn can_serve(&self, sound_point: &SoundPoint) -> bool {
        self.pitches.contains(sound_point.pitch())
    }
}

/// Plays the sound points accepted by a closure.
pub struct PredicateServer<F> {
    predicate: F,
    record: ServerRecord,
}

impl<F: Fn(&SoundPoint) -> bool> PredicateServer<F> {
    pub fn new(predicate: F) -> Self {
        PredicateServer {
            predicate,
            record: ServerRecord::new(),
        }
    }
}

impl<F: Fn(&SoundPoint) -> bool> Server for PredicateServer<F> {
    fn record(&self) -> &ServerRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut ServerRecord {
        &mut self.record
    }

    fn can_serve(&self, sound_point: &SoundPoint) -> bool {
        (self.predicate)(sound_point)
    }
}

impl<F> fmt::Debug for PredicateServer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateServer")
            .field("record", &self.record)
            .finish()
    }
}

/// Index of the server that becomes free first, the lowest index on ties.
pub fn next_available_server<S: Server>(servers: &[S]) -> Option<usize> {
    servers
        .iter()
        .enumerate()
        .min_by_key(|(index, server)| (server.offset_instance(), *index))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Time {
        s.parse().unwrap()
    }

    #[test]
    fn gap_becomes_silence() {
        let mut server = NoteServer::new();
        server.serve(Time::int(1), &SoundPoint::new(Time::int(99999), t("0.5"), 0));
        assert_eq!(server.record().durations(), vec![Time::int(1), t("0.5")]);
        assert_eq!(server.record().pitches(), vec![None, Some(Pitch::from(0))]);
        assert_eq!(server.offset_instance(), t("1.5"));
    }

    #[test]
    fn back_to_back_has_no_silence() {
        let mut record = ServerRecord::new();
        let point = SoundPoint::new(Time::zero(), Time::int(1), 3);
        record.serve(Time::zero(), &point);
        record.serve(Time::int(1), &point);
        assert_eq!(record.events().len(), 2);
        assert_eq!(record.offset_instance(), Time::int(2));
        assert_eq!(record.served_sound_points().count(), 2);
    }

    #[test]
    fn q_events_in_milliseconds() {
        let mut record = ServerRecord::new();
        let point = SoundPoint::new(Time::zero(), t("0.25"), 2)
            .with_attachments(vec![Attachment::Dynamic("p".into())]);
        record.serve(t("0.5"), &point);
        assert_eq!(
            record.millisecond_q_events(),
            vec![
                QEvent {
                    duration: Rational::int(500),
                    pitch: None,
                    attachments: vec![],
                },
                QEvent {
                    duration: Rational::int(250),
                    pitch: Some(Pitch::from(2)),
                    attachments: vec![Attachment::Dynamic("p".into())],
                },
            ]
        );
    }

    #[test]
    fn servability() {
        let low = SoundPoint::new(Time::zero(), Time::one(), 0);
        let high = SoundPoint::new(Time::zero(), Time::one(), 12);

        assert!(NoteServer::new().can_serve(&high));

        let server = PitchServer::new(vec![0, 1]);
        assert_eq!(server.pitches(), &[Pitch::from(0), Pitch::from(1)]);
        assert!(server.can_serve(&low));
        assert!(!server.can_serve(&high));

        let server = PredicateServer::new(|point: &SoundPoint| point.pitch() > &Pitch::from(6));
        assert!(!server.can_serve(&low));
        assert!(server.can_serve(&high));
    }

    #[test]
    fn next_available() {
        assert_eq!(next_available_server::<NoteServer>(&[]), None);

        let servers = vec![NoteServer::new()];
        assert_eq!(next_available_server(&servers), Some(0));

        let mut servers = vec![NoteServer::new(), NoteServer::new(), NoteServer::new()];
        let long = SoundPoint::new(Time::zero(), Time::int(2), 0);
        let short = long.with_duration(Time::one());
        servers[0].serve(Time::zero(), &long);
        servers[1].serve(Time::zero(), &short);
        servers[2].serve(Time::zero(), &short);
        assert_eq!(next_available_server(&servers), Some(1));
    }

    #[test]
    fn boxed_servers_mix() {
        let mut servers: Vec<Box<dyn Server>> =
            vec![Box::new(NoteServer::new()), Box::new(PitchServer::new(vec![5]))];
        let point = SoundPoint::new(Time::zero(), Time::one(), 0);
        assert!(servers[0].can_serve(&point));
        assert!(!servers[1].can_serve(&point));
        servers[0].serve(Time::zero(), &point);
        assert_eq!(servers[0].offset_instance(), Time::one());
    }
}
