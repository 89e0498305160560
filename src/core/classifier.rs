// src/core/classifier.rs
//
// Classifies the sample format, byte order and channel count of raw audio.
//
// Natural audio is low-pass: most of its energy sits well below Nyquist.
// Decoding the bytes with the right format keeps that shape, while a wrong
// width or byte order scrambles the bits into broadband noise. Each
// hypothesis is scored by its low-band to high-band power ratio and the
// largest ratio wins.

use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::config::{Band, ClassifierConfig};
use crate::detection::{ClassificationResult, HypothesisScore};
use crate::error::{ClassifyError, Result};
use super::dsp::{
    accumulate, arg_max, equalizer_mask, mean, polyphase_fold, rms, sinc_hann, SpecPowerMeter,
};
use super::format::{Endianness, FormatClass, SampleFormat};
use super::reader::MultiFormatReader;
use super::sink::{NullSink, SignalSink};

/// Coherently integrated windows read under one hypothesis
#[derive(Debug, Clone)]
pub struct IntegratedSignal {
    pub class: FormatClass,
    pub channels: u16,
    /// Windows that contributed to `samples`
    pub windows: usize,
    pub samples: Vec<f32>,
}

/// Bands measured in one channel pass
#[derive(Debug, Clone, Copy)]
struct PassBands {
    low: Option<Band>,
    high: Band,
}

/// Powers measured for one hypothesis once its samples are consumed
#[derive(Debug, Clone, Copy)]
struct Measurement {
    class: FormatClass,
    windows: usize,
    /// `(low, high)` band powers, `None` if the signal was degenerate
    powers: Option<(Option<f32>, f32)>,
}

/// Raw audio format classifier
pub struct FormatClassifier<R> {
    config: ClassifierConfig,
    reader: MultiFormatReader<R>,
    meter: SpecPowerMeter,
    classes: Vec<FormatClass>,
    raw: Vec<u8>,
    window: Vec<f32>,
    sink: Box<dyn SignalSink>,
}

impl FormatClassifier<BufReader<File>> {
    /// Open a file for classification
    pub fn open<P: AsRef<Path>>(path: P, config: ClassifierConfig) -> Result<Self> {
        Self::new(MultiFormatReader::open(path)?, config)
    }
}

impl<R: Read + Seek> FormatClassifier<R> {
    pub fn new(reader: MultiFormatReader<R>, config: ClassifierConfig) -> Result<Self> {
        config.validate()?;

        let decimated = config.decimated_len();
        let mut meter = SpecPowerMeter::new(decimated);
        meter.set_equalizer(&equalizer_mask(
            decimated,
            config.dither_f1,
            config.dither_f2,
            config.dither_attenuation_db,
        ));

        Ok(Self {
            raw: vec![0u8; config.raw_buffer_len()],
            window: sinc_hann(config.window_len),
            classes: FormatClass::search_space(),
            meter,
            reader,
            config,
            sink: Box::new(NullSink),
        })
    }

    /// Route integrated signals to a diagnostic sink
    pub fn with_sink(mut self, sink: Box<dyn SignalSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the full pipeline: signal start search, mono and stereo feature
    /// extraction, decision.
    pub fn classify(&mut self) -> Result<ClassificationResult> {
        let signal_start = self.find_signal_start()?;
        info!("Signal start at byte {}", signal_start);

        info!("Extracting mono features");
        let mono_signals = self.integrate_all(signal_start, 1)?;
        self.meter.enable_equalizer();
        let mono_bands = PassBands {
            low: Some(self.config.mono_low),
            high: self.config.mono_high,
        };
        let mono_scores: Vec<HypothesisScore> = self
            .measure_all(mono_signals, mono_bands)?
            .iter()
            .map(|m| match m.powers {
                Some((low, high)) => score(m, low.unwrap_or(f32::NAN), high),
                None => degenerate(m),
            })
            .collect();

        info!("Extracting stereo features");
        let stereo_signals = self.integrate_all(signal_start, 2)?;
        self.meter.disable_equalizer();
        let stereo_bands = PassBands {
            low: None,
            high: self.config.stereo_high,
        };
        // The stereo ratio reuses the mono pass's low-band power
        let stereo_scores: Vec<HypothesisScore> = self
            .measure_all(stereo_signals, stereo_bands)?
            .iter()
            .zip(&mono_scores)
            .map(|(m, mono)| match m.powers {
                Some((_, high)) => score(m, mono.low_power, high),
                None => degenerate(m),
            })
            .collect();

        for (m, s) in mono_scores.iter().zip(&stereo_scores) {
            debug!(
                "{}: mono {:.3} stereo {:.3} PLo {:.3} PHiM {:.3} dB PHiS {:.3} dB",
                m.class,
                m.feature,
                s.feature,
                m.low_power,
                10.0 * m.high_power.log10(),
                10.0 * s.high_power.log10()
            );
        }

        let mono_features: Vec<f32> = mono_scores.iter().map(|s| s.feature).collect();
        let stereo_features: Vec<f32> = stereo_scores.iter().map(|s| s.feature).collect();
        let (winner, channels) = decide(&mono_features, &stereo_features);
        let class = self.classes[winner];

        info!("Classified as {} with {} channel(s)", class, channels);

        Ok(ClassificationResult {
            format: class.format,
            endianness: class.endianness,
            channels,
            signal_start,
            mono_scores,
            stereo_scores,
        })
    }

    /// Byte offset of the first probe window carrying any energy.
    ///
    /// Probes are read as little-endian uint8 starting past the header skip
    /// and spaced `search_grid` windows apart. Falls back to the header skip
    /// when the stream ends first.
    pub fn find_signal_start(&mut self) -> Result<u64> {
        let wl = self.config.window_len;
        let grid_bytes = (self.config.search_grid * wl) as u64;
        let mut probe = vec![0.0f32; wl];
        let mut offset = self.config.header_skip;
        let mut probes = 0usize;

        loop {
            self.reader.reset(offset)?;
            let read = self.reader.read_samples(
                &mut self.raw,
                wl,
                1,
                SampleFormat::Uint8,
                Endianness::Little,
            )?;
            if read < wl {
                break;
            }

            SampleFormat::Uint8.decode_into(&self.raw[..wl], &mut probe);
            let level = rms(&probe[..self.config.probe_len]);
            if level.is_nan() {
                break;
            }
            if level >= self.config.min_rms {
                debug!("Signal found after {} probe(s)", probes);
                return Ok(offset);
            }

            probes += 1;
            offset += grid_bytes;
        }

        debug!("No signal found after {} probe(s)", probes);
        Ok(self.config.header_skip)
    }

    /// Read and integrate windows for one hypothesis.
    ///
    /// Full windows are summed sample-wise; between windows a gap of
    /// `k + 1` samples (growing with the window index `k`) is skipped to
    /// decorrelate their phases. Stops after `max_integrations` windows or
    /// at the first short read.
    pub fn integrate(
        &mut self,
        start: u64,
        class: FormatClass,
        channels: u16,
    ) -> Result<IntegratedSignal> {
        let wl = self.config.window_len;
        let stride = channels.max(1) as usize;
        let width = class.format.width();

        let mut samples = vec![0.0f32; wl];
        let mut aux = vec![0.0f32; wl];
        let mut windows = 0usize;
        let mut n = 0usize;

        self.reader.reset(start)?;

        loop {
            let read = self.reader.read_samples(
                &mut self.raw,
                wl,
                stride,
                class.format,
                class.endianness,
            )?;

            if n == 0 {
                class.format.decode_into(&self.raw[..read * width], &mut samples);
                if read > 0 {
                    windows += 1;
                }
            } else if read == wl {
                class.format.decode_into(&self.raw, &mut aux);
                accumulate(&mut samples, &aux);
                windows += 1;

                self.reader.read_samples(
                    &mut self.raw,
                    n + 1,
                    stride,
                    class.format,
                    class.endianness,
                )?;
            }

            n += 1;
            if n >= self.config.max_integrations || read != wl {
                break;
            }
        }

        debug!("{} ({} ch): integrated {} window(s)", class, channels, windows);

        Ok(IntegratedSignal {
            class,
            channels,
            windows,
            samples,
        })
    }

    fn integrate_all(&mut self, start: u64, channels: u16) -> Result<Vec<IntegratedSignal>> {
        let mut signals = Vec::with_capacity(self.classes.len());

        for i in 0..self.classes.len() {
            let signal = self.integrate(start, self.classes[i], channels)?;
            if let Err(e) = self.sink.write_signal(signal.class, channels, &signal.samples) {
                warn!("Failed to write diagnostic signal: {}", e);
            }
            signals.push(signal);
        }

        Ok(signals)
    }

    /// Score each owned signal, in parallel when configured
    fn measure_all(
        &mut self,
        signals: Vec<IntegratedSignal>,
        bands: PassBands,
    ) -> Result<Vec<Measurement>> {
        let window = &self.window;
        let taps = self.config.poly_taps;

        if self.config.parallel_scoring {
            let meter = &self.meter;
            signals
                .into_par_iter()
                .map_init(|| meter.clone(), |m, s| measure(s, window, taps, m, bands))
                .collect()
        } else {
            let meter = &mut self.meter;
            signals
                .into_iter()
                .map(|s| measure(s, window, taps, meter, bands))
                .collect()
        }
    }
}

/// Open, classify and close a file in one call
pub fn classify_file<P: AsRef<Path>>(
    path: P,
    config: ClassifierConfig,
) -> Result<ClassificationResult> {
    FormatClassifier::open(path, config)?.classify()
}

/// Polyphase low-pass/decimate, remove DC and normalize to unit RMS.
///
/// Fails with `DegenerateSignal` when the decimated signal has zero or
/// non-finite RMS.
pub fn preprocess(mut samples: Vec<f32>, window: &[f32], taps: usize) -> Result<Vec<f32>> {
    let mut x = polyphase_fold(&mut samples, window, taps);

    let dc = mean(&x);
    x.iter_mut().for_each(|s| *s -= dc);

    let level = rms(&x);
    if level == 0.0 || !level.is_finite() {
        return Err(ClassifyError::DegenerateSignal);
    }
    x.iter_mut().for_each(|s| *s /= level);

    Ok(x)
}

fn measure(
    signal: IntegratedSignal,
    window: &[f32],
    taps: usize,
    meter: &mut SpecPowerMeter,
    bands: PassBands,
) -> Result<Measurement> {
    let IntegratedSignal {
        class,
        channels,
        windows,
        samples,
    } = signal;

    let powers = match preprocess(samples, window, taps) {
        Ok(x) => {
            let low = bands
                .low
                .map(|b| meter.calc_power(&x, b.center, b.bandwidth));
            let high = meter.calc_power(&x, bands.high.center, bands.high.bandwidth);
            Some((low, high))
        }
        Err(e) if e.is_recoverable() => {
            debug!("{} ({} ch): {}", class, channels, e);
            None
        }
        Err(e) => return Err(e),
    };

    Ok(Measurement {
        class,
        windows,
        powers,
    })
}

/// Low/high power ratio; NaN maps to the lowest possible score
pub fn feature_ratio(low: f32, high: f32) -> f32 {
    let ratio = low / high;
    if ratio.is_nan() {
        f32::NEG_INFINITY
    } else {
        ratio
    }
}

fn score(m: &Measurement, low: f32, high: f32) -> HypothesisScore {
    HypothesisScore {
        class: m.class,
        windows: m.windows,
        low_power: low,
        high_power: high,
        feature: feature_ratio(low, high),
    }
}

fn degenerate(m: &Measurement) -> HypothesisScore {
    HypothesisScore {
        class: m.class,
        windows: m.windows,
        low_power: f32::NAN,
        high_power: f32::NAN,
        feature: f32::NEG_INFINITY,
    }
}

/// Pick the winning hypothesis index and channel count.
///
/// Stereo must beat mono strictly; ties go to mono.
pub fn decide(mono: &[f32], stereo: &[f32]) -> (usize, u16) {
    let (mono_idx, mono_max) = arg_max(mono);
    let (stereo_idx, stereo_max) = arg_max(stereo);

    debug!("monoMax is {}, stereoMax is {}", mono_max, stereo_max);

    if stereo_max > mono_max {
        (stereo_idx, 2)
    } else {
        (mono_idx, 1)
    }
}
