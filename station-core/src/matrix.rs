//! Matrix Codec für die 5x5 WS2812-Matrix
//!
//! - Logisches Raster `[zeile][spalte]` → Strip-Index (Serpentinen-Verdrahtung)
//! - Helligkeits-Skalierung
//! - 24-Bit-Farbworte (GRB, MSB zuerst) und Puls-Timing pro Bit
//! - Fünf feste Glyphen (Smiley, T, P, A, U) plus leeres Raster

use rgb::RGB8;

use crate::traits::{LedError, LedStripSink};

/// Kantenlänge der Matrix
pub const MATRIX_SIZE: usize = 5;

/// Anzahl der LEDs im Strip
pub const PIXEL_COUNT: usize = MATRIX_SIZE * MATRIX_SIZE;

/// Bits pro LED (8 Bit G, R, B)
pub const BITS_PER_PIXEL: usize = 24;

/// Default-Helligkeit für "an"-Zellen wenn keine Farbe angegeben ist
pub const DEFAULT_INK_LEVEL: u8 = 12;

/// Logisches Raster, indiziert als `frame[zeile][spalte]`
pub type Frame = [[RGB8; MATRIX_SIZE]; MATRIX_SIZE];

/// Pixel in physischer Strip-Reihenfolge
pub type StripFrame = [RGB8; PIXEL_COUNT];

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

// ============================================================================
// WS2812 Timing
// ============================================================================

/// High/Low-Dauer eines einzelnen Bits in Nanosekunden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub high_ns: u16,
    pub low_ns: u16,
}

pub const ZERO_PULSE: Pulse = Pulse {
    high_ns: 400,
    low_ns: 850,
};

pub const ONE_PULSE: Pulse = Pulse {
    high_ns: 800,
    low_ns: 450,
};

/// Reset-Pause nach einem Frame (Datenblatt fordert >= 50 µs)
pub const RESET_GAP_US: u32 = 100;

pub const fn pulse_for_bit(bit: bool) -> Pulse {
    if bit { ONE_PULSE } else { ZERO_PULSE }
}

/// Obergrenze für die Dauer einer kompletten Matrix-Übertragung
pub const fn frame_duration_us() -> u32 {
    let bit_ns = if ZERO_PULSE.high_ns as u32 + ZERO_PULSE.low_ns as u32
        > ONE_PULSE.high_ns as u32 + ONE_PULSE.low_ns as u32
    {
        ZERO_PULSE.high_ns as u32 + ZERO_PULSE.low_ns as u32
    } else {
        ONE_PULSE.high_ns as u32 + ONE_PULSE.low_ns as u32
    };
    (bit_ns * (PIXEL_COUNT * BITS_PER_PIXEL) as u32).div_ceil(1000) + RESET_GAP_US
}

// ============================================================================
// Koordinaten & Encoding
// ============================================================================

/// Logische Position → physischer Strip-Index
///
/// Gerade Zeilen laufen von rechts nach links, ungerade von links nach
/// rechts; Index 24 sitzt oben links. Entspricht der Verdrahtung der Platine.
pub const fn strip_index(row: usize, col: usize) -> usize {
    if row % 2 == 0 {
        24 - (row * MATRIX_SIZE + col)
    } else {
        24 - (row * MATRIX_SIZE + (MATRIX_SIZE - 1 - col))
    }
}

/// Ordnet ein logisches Raster in Strip-Reihenfolge um
pub fn to_strip(frame: &Frame) -> StripFrame {
    let mut strip = [OFF; PIXEL_COUNT];
    for (row, cells) in frame.iter().enumerate() {
        for (col, color) in cells.iter().enumerate() {
            strip[strip_index(row, col)] = *color;
        }
    }
    strip
}

/// Multipliziert jeden Kanal mit `scale` und schneidet auf 8 Bit ab
///
/// Der Faktor wird nicht geklemmt. Aufrufer sind für `[0, 1]` zuständig;
/// außerhalb sättigt der Cast (> 1 → bis 255, negativ → 0).
pub fn scale_brightness(frame: &mut Frame, scale: f32) {
    for color in frame.iter_mut().flatten() {
        color.r = (color.r as f32 * scale) as u8;
        color.g = (color.g as f32 * scale) as u8;
        color.b = (color.b as f32 * scale) as u8;
    }
}

/// 24-Bit-Wort in Übertragungsreihenfolge: Grün, Rot, Blau
pub const fn encode_word(color: RGB8) -> u32 {
    ((color.g as u32) << 16) | ((color.r as u32) << 8) | color.b as u32
}

/// Bits eines Wortes, MSB zuerst
pub fn word_bits(word: u32) -> impl Iterator<Item = bool> + Clone {
    (0..BITS_PER_PIXEL).rev().map(move |bit| (word >> bit) & 1 == 1)
}

/// Puls-Folge für ein komplettes Farbwort
pub fn word_pulses(word: u32) -> impl Iterator<Item = Pulse> {
    word_bits(word).map(pulse_for_bit)
}

/// Sendet einen Strip-Frame: 25 Worte, danach die Reset-Pause
pub fn transmit<S: LedStripSink>(strip: &StripFrame, sink: &mut S) -> Result<(), LedError> {
    for color in strip {
        sink.write_word(encode_word(*color))?;
    }
    sink.reset_gap()
}

/// Rendert ein logisches Raster und überträgt es
pub fn show<S: LedStripSink>(frame: &Frame, sink: &mut S) -> Result<(), LedError> {
    transmit(&to_strip(frame), sink)
}

// ============================================================================
// Glyphen
// ============================================================================

/// Fest definierte Matrix-Symbole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    /// Neutraler Smiley (alles im Bereich)
    Smile,
    /// Temperatur
    T,
    /// Druck
    P,
    /// Höhe
    A,
    /// Luftfeuchte ("Umidade")
    U,
    Blank,
}

type Pattern = [[u8; MATRIX_SIZE]; MATRIX_SIZE];

const SMILE: Pattern = [
    [0, 0, 0, 0, 0],
    [0, 1, 0, 1, 0],
    [0, 0, 0, 0, 0],
    [1, 0, 0, 0, 1],
    [0, 1, 1, 1, 0],
];

const LETTER_T: Pattern = [
    [1, 1, 1, 1, 1],
    [0, 0, 1, 0, 0],
    [0, 0, 1, 0, 0],
    [0, 0, 1, 0, 0],
    [0, 0, 1, 0, 0],
];

const LETTER_P: Pattern = [
    [1, 1, 1, 1, 0],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 0],
    [1, 0, 0, 0, 0],
    [1, 0, 0, 0, 0],
];

const LETTER_A: Pattern = [
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
];

const LETTER_U: Pattern = [
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [0, 1, 1, 1, 0],
];

const BLANK: Pattern = [[0; MATRIX_SIZE]; MATRIX_SIZE];

impl Glyph {
    fn pattern(self) -> &'static Pattern {
        match self {
            Glyph::Smile => &SMILE,
            Glyph::T => &LETTER_T,
            Glyph::P => &LETTER_P,
            Glyph::A => &LETTER_A,
            Glyph::U => &LETTER_U,
            Glyph::Blank => &BLANK,
        }
    }

    /// Farbe für "an"-Zellen wenn der Aufrufer keine angibt
    ///
    /// Der Smiley ist grün, Buchstaben sind gedimmtes Weiß.
    pub const fn default_ink(self) -> RGB8 {
        match self {
            Glyph::Smile => RGB8 {
                r: 0,
                g: DEFAULT_INK_LEVEL,
                b: 0,
            },
            _ => RGB8 {
                r: DEFAULT_INK_LEVEL,
                g: DEFAULT_INK_LEVEL,
                b: DEFAULT_INK_LEVEL,
            },
        }
    }

    /// Setzt die Tinte in das An/Aus-Muster ein
    pub fn frame(self, ink: Option<RGB8>) -> Frame {
        let ink = ink.unwrap_or(self.default_ink());
        let mut frame = [[OFF; MATRIX_SIZE]; MATRIX_SIZE];
        for (cells, pattern_row) in frame.iter_mut().zip(self.pattern()) {
            for (cell, on) in cells.iter_mut().zip(pattern_row) {
                if *on != 0 {
                    *cell = ink;
                }
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_index_corners() {
        assert_eq!(strip_index(0, 0), 24);
        assert_eq!(strip_index(0, 4), 20);
        assert_eq!(strip_index(1, 0), 15);
        assert_eq!(strip_index(1, 4), 19);
        assert_eq!(strip_index(4, 0), 4);
        assert_eq!(strip_index(4, 4), 0);
    }

    #[test]
    fn test_strip_index_is_bijection() {
        let mut seen = [false; PIXEL_COUNT];
        for row in 0..MATRIX_SIZE {
            for col in 0..MATRIX_SIZE {
                let idx = strip_index(row, col);
                assert!(idx < PIXEL_COUNT);
                assert!(!seen[idx], "index {} mapped twice", idx);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_encode_word_grb_order() {
        let word = encode_word(RGB8 {
            r: 0x11,
            g: 0x22,
            b: 0x33,
        });
        assert_eq!(word, 0x22_11_33);
    }

    #[test]
    fn test_word_bits_msb_first() {
        let mut bits = word_bits(0x80_00_01);
        assert_eq!(bits.next(), Some(true));
        assert_eq!(bits.clone().count(), 23);
        assert_eq!(bits.last(), Some(true));
        assert_eq!(word_bits(0x40_00_00).nth(1), Some(true));
    }

    #[test]
    fn test_scale_brightness_truncates() {
        let mut frame = Glyph::T.frame(Some(RGB8 { r: 12, g: 7, b: 255 }));
        scale_brightness(&mut frame, 0.5);
        assert_eq!(frame[0][0], RGB8 { r: 6, g: 3, b: 127 });
        assert_eq!(frame[1][0], OFF);
    }

    #[test]
    fn test_scale_brightness_not_clamped_saturates() {
        let mut frame = Glyph::T.frame(Some(RGB8 {
            r: 200,
            g: 12,
            b: 0,
        }));
        scale_brightness(&mut frame, 2.0);
        assert_eq!(frame[0][0], RGB8 { r: 255, g: 24, b: 0 });
    }

    #[test]
    fn test_glyph_default_ink() {
        let smile = Glyph::Smile.frame(None);
        assert_eq!(smile[1][1], RGB8 { r: 0, g: 12, b: 0 });
        assert_eq!(smile[0][0], OFF);

        let t = Glyph::T.frame(None);
        assert_eq!(t[0][2], RGB8 { r: 12, g: 12, b: 12 });
        assert_eq!(t[4][2], RGB8 { r: 12, g: 12, b: 12 });
        assert_eq!(t[4][0], OFF);
    }

    #[test]
    fn test_blank_glyph_is_dark() {
        let frame = Glyph::Blank.frame(Some(RGB8 { r: 1, g: 1, b: 1 }));
        assert!(frame.iter().flatten().all(|c| *c == OFF));
    }

    #[test]
    fn test_frame_duration_bounded() {
        // 25 LEDs * 24 Bit * 1.25 µs + Reset
        assert_eq!(frame_duration_us(), 750 + RESET_GAP_US);
    }
}
