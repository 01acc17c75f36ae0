//! Recording doubles for the radio and serial collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::comm::{SerialSink, SerialSource};
use crate::radio::{Radio, RadioStep, RxHandoff};
use crate::record::{FrameStorage, Heap, PacketRecord};

pub fn record(raw: &[u8], rssi: i8) -> PacketRecord {
    PacketRecord::capture(&Heap, raw, rssi).unwrap()
}

/// Storage that is always out of memory.
pub struct Exhausted;

impl FrameStorage for Exhausted {
    fn reserve(&self, _len: usize) -> Option<Vec<u8>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCall {
    Promiscuous(bool),
    PanId(u16),
    ShortAddress(u16),
    RxWhenIdle(bool),
    Receive,
    Transmit(Vec<u8>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct RadioFault;

#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    pub fail_on: Option<RadioStep>,
    pub fail_transmit: bool,
}

impl MockRadio {
    fn record(&mut self, call: RadioCall, step: RadioStep) -> Result<(), RadioFault> {
        self.calls.push(call);
        match self.fail_on {
            Some(failing) if failing == step => Err(RadioFault),
            _ => Ok(()),
        }
    }

    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Transmit(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn config_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| !matches!(c, RadioCall::Transmit(_)))
            .count()
    }
}

impl Radio for MockRadio {
    type Error = RadioFault;

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), RadioFault> {
        self.record(RadioCall::Promiscuous(enabled), RadioStep::Promiscuous)
    }

    fn set_pan_id(&mut self, pan_id: u16) -> Result<(), RadioFault> {
        self.record(RadioCall::PanId(pan_id), RadioStep::PanId)
    }

    fn set_short_address(&mut self, addr: u16) -> Result<(), RadioFault> {
        self.record(RadioCall::ShortAddress(addr), RadioStep::ShortAddress)
    }

    fn set_rx_when_idle(&mut self, enabled: bool) -> Result<(), RadioFault> {
        self.record(RadioCall::RxWhenIdle(enabled), RadioStep::RxWhenIdle)
    }

    fn receive(&mut self) -> Result<(), RadioFault> {
        self.record(RadioCall::Receive, RadioStep::Receive)
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioFault> {
        self.calls.push(RadioCall::Transmit(frame.to_vec()));
        if self.fail_transmit {
            Err(RadioFault)
        } else {
            Ok(())
        }
    }
}

/// Counts interrupt-side handoff calls.
#[derive(Default)]
pub struct MockRx {
    pub released: usize,
    pub rearmed: usize,
}

impl RxHandoff for MockRx {
    fn release(&mut self) {
        self.released += 1;
    }

    fn rearm(&mut self) {
        self.rearmed += 1;
    }
}

/// Serial output captured in memory.
#[derive(Default)]
pub struct MemorySerial {
    pub out: Mutex<Vec<u8>>,
    pub broken: bool,
}

impl MemorySerial {
    pub fn text(&self) -> String {
        String::from_utf8(self.out.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text()
            .split_inclusive("\r\n")
            .map(|s| s.to_string())
            .collect()
    }
}

impl SerialSink for MemorySerial {
    type Error = &'static str;

    fn write_all(&self, bytes: &[u8]) -> Result<(), &'static str> {
        if self.broken {
            return Err("port closed");
        }
        self.out.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }
}

/// Serial input replaying scripted chunks, then timing out.
#[derive(Default)]
pub struct ScriptedInput {
    pub chunks: VecDeque<Vec<u8>>,
    pub polls: usize,
}

impl ScriptedInput {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            polls: 0,
        }
    }
}

impl SerialSource for ScriptedInput {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<usize, &'static str> {
        self.polls += 1;
        match self.chunks.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}
