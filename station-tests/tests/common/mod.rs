//! Mock-Kollaborateure für die Host-Tests
//!
//! Jede Test-Datei bindet dieses Modul ein, nutzt aber nur einen Teil davon.

#![allow(dead_code)]

use rgb::RGB8;
use station_core::types::RawSample;
use station_core::{
    Buzzer, DisplayError, LedError, LedStripSink, SensorError, SensorSource, SmartLedWriter,
    TextDisplay,
};

// ============================================================================
// Mock LED Writer (Status-LED)
// ============================================================================

#[derive(Default)]
pub struct MockLedWriter {
    pub last_color: Option<RGB8>,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockLedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SmartLedWriter for MockLedWriter {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.last_color = Some(color);
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Mock Buzzer
// ============================================================================

#[derive(Default)]
pub struct MockBuzzer {
    pub active: bool,
    /// Anzahl der Einschalt-Flanken
    pub activations: usize,
}

impl Buzzer for MockBuzzer {
    fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.activations += 1;
        }
        self.active = active;
    }
}

// ============================================================================
// Mock Strip Sink (Matrix)
// ============================================================================

/// Zeichnet jedes Wort auf, `frames` enthält nur abgeschlossene Frames
#[derive(Default)]
pub struct MockStripSink {
    pub pending: Vec<u32>,
    pub frames: Vec<Vec<u32>>,
    pub fail_writes: bool,
}

impl MockStripSink {
    pub fn last_frame(&self) -> Option<&[u32]> {
        self.frames.last().map(|f| f.as_slice())
    }
}

impl LedStripSink for MockStripSink {
    fn write_word(&mut self, word: u32) -> Result<(), LedError> {
        if self.fail_writes {
            return Err(LedError::WriteFailed);
        }
        self.pending.push(word);
        Ok(())
    }

    fn reset_gap(&mut self) -> Result<(), LedError> {
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}

// ============================================================================
// Mock Sensor
// ============================================================================

/// Liefert die Samples der Reihe nach, danach das letzte erneut
pub struct MockSensor {
    pub samples: Vec<Result<RawSample, SensorError>>,
    pub reads: usize,
}

impl MockSensor {
    pub fn new(samples: Vec<Result<RawSample, SensorError>>) -> Self {
        Self { samples, reads: 0 }
    }

    pub fn constant(sample: RawSample) -> Self {
        Self::new(vec![Ok(sample)])
    }

    pub fn push(&mut self, sample: Result<RawSample, SensorError>) {
        self.samples.push(sample);
    }
}

impl SensorSource for MockSensor {
    fn read_calibrated(&mut self) -> Result<RawSample, SensorError> {
        let idx = self.reads.min(self.samples.len().saturating_sub(1));
        self.reads += 1;
        self.samples
            .get(idx)
            .copied()
            .unwrap_or(Err(SensorError::NotReady))
    }
}

// ============================================================================
// Mock Display
// ============================================================================

#[derive(Default)]
pub struct MockDisplay {
    /// Aktuell gezeichnete Zeilen (Text, x, y)
    pub lines: Vec<(String, i32, i32)>,
    pub flushes: usize,
    pub fail_flush: bool,
}

impl MockDisplay {
    pub fn text_at(&self, y: i32) -> Option<&str> {
        self.lines
            .iter()
            .find(|(_, _, line_y)| *line_y == y)
            .map(|(text, _, _)| text.as_str())
    }
}

impl TextDisplay for MockDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lines.clear();
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        self.lines.push((text.to_string(), x, y));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.fail_flush {
            return Err(DisplayError::Bus);
        }
        self.flushes += 1;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Sample, das mit Default-Settings komplett im Bereich liegt
pub fn nominal_sample() -> RawSample {
    RawSample {
        temp_primary_c: 22.0,
        pressure_pa: 101_325.0,
        humidity_rh: 45.0,
        temp_secondary_c: 23.0,
    }
}
