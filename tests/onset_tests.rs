//! Validation tests for spectral-flux onset detection

use hum2midi::config::Config;
use hum2midi::stages::onset::detect_onsets;
use std::f32::consts::PI;

/// Synthetic clip with sharp tone attacks at the given times
fn generate_attacks(n_samples: usize, sr: u32, attacks_sec: &[f32]) -> Vec<f32> {
    let mut audio = vec![0.0; n_samples];

    for &attack_time in attacks_sec {
        let start_sample = (attack_time * sr as f32) as usize;
        if start_sample >= n_samples {
            continue;
        }

        // short attack, exponential decay, tone plus a noisy click edge
        for i in 0..(sr as usize / 5).min(n_samples - start_sample) {
            let t = i as f32 / sr as f32;
            let envelope = (-t * 12.0).exp();
            let tone = (2.0 * PI * 440.0 * t).sin();
            let click = (rand::random::<f32>() - 0.5) * 2.0;
            audio[start_sample + i] += (tone * 0.8 + click * 0.2) * envelope * 0.6;
        }
    }

    audio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_no_onsets() {
        let config = Config::default();
        let onsets = detect_onsets(&vec![0.0; 44_100 * 3], 44_100, &config);
        assert!(onsets.is_empty(), "got {:?}", onsets);
    }

    #[test]
    fn test_sub_window_input_has_no_onsets() {
        let config = Config::default();
        let onsets = detect_onsets(&[0.3; 512], 44_100, &config);
        assert!(onsets.is_empty());
    }

    #[test]
    fn test_known_attacks_are_recovered() {
        let sr = 44_100;
        let known = [0.5, 1.0, 1.5, 2.0];
        let audio = generate_attacks(sr as usize * 3, sr, &known);
        let config = Config::default();

        let onsets = detect_onsets(&audio, sr, &config);

        let mut recovered = 0;
        for &expected in &known {
            if onsets.iter().any(|&t| (t - expected).abs() < 0.05) {
                recovered += 1;
            }
        }
        assert!(
            recovered >= 3,
            "recovered {}/{} attacks from {:?}",
            recovered,
            known.len(),
            onsets
        );
    }

    #[test]
    fn test_onsets_are_ascending_and_unique() {
        let sr = 44_100;
        let audio = generate_attacks(sr as usize * 3, sr, &[0.4, 0.9, 1.3, 1.9, 2.4]);
        let config = Config::default();

        let onsets = detect_onsets(&audio, sr, &config);
        for pair in onsets.windows(2) {
            assert!(pair[1] > pair[0], "onsets not strictly ascending: {:?}", onsets);
        }
    }

    #[test]
    fn test_refractory_suppresses_double_triggers() {
        let sr = 44_100;
        let audio = generate_attacks(sr as usize * 2, sr, &[1.0]);
        let config = Config::default();

        let onsets = detect_onsets(&audio, sr, &config);
        // a single attack must not report two onsets inside the refractory gap
        for pair in onsets.windows(2) {
            assert!((pair[1] - pair[0]) * 1000.0 >= config.onset.refractory_ms - 1.0);
        }
    }
}
