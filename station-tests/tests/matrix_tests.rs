//! Integration Tests für den Matrix Codec

mod common;

use common::MockStripSink;
use rgb::RGB8;
use station_core::Glyph;
use station_core::matrix::{
    BITS_PER_PIXEL, Frame, MATRIX_SIZE, ONE_PULSE, PIXEL_COUNT, ZERO_PULSE, encode_word,
    frame_duration_us, show, strip_index, to_strip, word_pulses,
};

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

// ============================================================================
// Tests: Serpentinen-Mapping
// ============================================================================

#[test]
fn test_strip_index_examples() {
    assert_eq!(strip_index(0, 0), 24);
    assert_eq!(strip_index(4, 0), 4);
    assert_eq!(strip_index(2, 2), 12);
    assert_eq!(strip_index(3, 1), 24 - (3 * 5 + 3));
}

#[test]
fn test_adjacent_rows_meet_at_same_edge() {
    // Serpentine: Ende einer Zeile und Anfang der nächsten liegen übereinander
    for row in 0..MATRIX_SIZE - 1 {
        let lowest_in_row = (0..MATRIX_SIZE)
            .map(|col| strip_index(row, col))
            .min()
            .unwrap();
        let highest_in_next = (0..MATRIX_SIZE)
            .map(|col| strip_index(row + 1, col))
            .max()
            .unwrap();
        assert_eq!(lowest_in_row, highest_in_next + 1);

        let col_low = (0..MATRIX_SIZE)
            .find(|col| strip_index(row, *col) == lowest_in_row)
            .unwrap();
        let col_high = (0..MATRIX_SIZE)
            .find(|col| strip_index(row + 1, *col) == highest_in_next)
            .unwrap();
        assert_eq!(col_low, col_high);
    }
}

#[test]
fn test_to_strip_places_every_cell_once() {
    let mut frame: Frame = [[OFF; MATRIX_SIZE]; MATRIX_SIZE];
    for (row, cells) in frame.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            *cell = RGB8 {
                r: row as u8,
                g: col as u8,
                b: 1,
            };
        }
    }

    let strip = to_strip(&frame);
    for row in 0..MATRIX_SIZE {
        for col in 0..MATRIX_SIZE {
            assert_eq!(strip[strip_index(row, col)], frame[row][col]);
        }
    }
    assert!(strip.iter().all(|c| c.b == 1));
}

// ============================================================================
// Tests: Übertragung
// ============================================================================

#[test]
fn test_show_sends_one_word_per_pixel_then_reset() {
    let mut sink = MockStripSink::default();
    show(&Glyph::T.frame(None), &mut sink).unwrap();

    assert_eq!(sink.frames.len(), 1);
    assert!(sink.pending.is_empty());
    let frame = sink.last_frame().unwrap();
    assert_eq!(frame.len(), PIXEL_COUNT);

    // Oberste Zeile des T ist komplett an → Strip 20..=24
    let lit = encode_word(RGB8 { r: 12, g: 12, b: 12 });
    for idx in 20..=24 {
        assert_eq!(frame[idx], lit);
    }
    // Stamm in Spalte 2, Zeile 4 → Index 2
    assert_eq!(frame[2], lit);
    assert_eq!(frame[0], 0);
}

#[test]
fn test_show_aborts_on_sink_error() {
    let mut sink = MockStripSink {
        fail_writes: true,
        ..Default::default()
    };
    assert!(show(&Glyph::Smile.frame(None), &mut sink).is_err());
    assert!(sink.frames.is_empty());
}

#[test]
fn test_word_pulses_grb_msb_first() {
    // Grün = 0x80 → erstes Bit 1, der Rest 0
    let word = encode_word(RGB8 { r: 0, g: 0x80, b: 0 });
    let pulses: Vec<_> = word_pulses(word).collect();

    assert_eq!(pulses.len(), BITS_PER_PIXEL);
    assert_eq!(pulses[0], ONE_PULSE);
    assert!(pulses[1..].iter().all(|p| *p == ZERO_PULSE));

    // Blau = 0x01 → nur das letzte Bit
    let pulses: Vec<_> = word_pulses(encode_word(RGB8 { r: 0, g: 0, b: 1 })).collect();
    assert_eq!(pulses[BITS_PER_PIXEL - 1], ONE_PULSE);
    assert!(pulses[..BITS_PER_PIXEL - 1].iter().all(|p| *p == ZERO_PULSE));
}

#[test]
fn test_pulse_widths_within_ws2812_tolerance() {
    for pulse in [ZERO_PULSE, ONE_PULSE] {
        let period = pulse.high_ns as u32 + pulse.low_ns as u32;
        assert!((1_100..=1_400).contains(&period));
    }
    assert!(ONE_PULSE.high_ns > ZERO_PULSE.high_ns);
}

#[test]
fn test_frame_transmission_is_short() {
    // Blockierende Übertragung muss unter einer Millisekunde bleiben
    assert!(frame_duration_us() < 1_000);
}

// ============================================================================
// Tests: Glyphen
// ============================================================================

#[test]
fn test_all_letters_use_ink_override() {
    let ink = RGB8 { r: 1, g: 2, b: 3 };
    for glyph in [Glyph::T, Glyph::P, Glyph::A, Glyph::U, Glyph::Smile] {
        let frame = glyph.frame(Some(ink));
        let lit = frame.iter().flatten().filter(|c| **c == ink).count();
        let dark = frame.iter().flatten().filter(|c| **c == OFF).count();
        assert!(lit > 0, "{:?} has no lit cells", glyph);
        assert_eq!(lit + dark, PIXEL_COUNT);
    }
}

#[test]
fn test_glyphs_are_distinct() {
    let ink = Some(RGB8 { r: 1, g: 1, b: 1 });
    let glyphs = [Glyph::Smile, Glyph::T, Glyph::P, Glyph::A, Glyph::U, Glyph::Blank];
    for (i, a) in glyphs.iter().enumerate() {
        for b in &glyphs[i + 1..] {
            assert_ne!(a.frame(ink), b.frame(ink), "{:?} == {:?}", a, b);
        }
    }
}
