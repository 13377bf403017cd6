//! Stage construction shared by the integration tests.
#![allow(dead_code)]

use cassette_core::{ParamDescriptor, TapeModule};
use cassette_effects::{
    Azimuth, Compander, Crosstalk, Dropouts, Eq, EqSettings, HeadBump, HfLoss, Hiss, Meters,
    Saturation, WowFlutter, azimuth, compander, crosstalk, dropouts, eq, head_bump, hf_loss, hiss,
    saturation, wow_flutter,
};

pub const STAGE_COUNT: usize = 11;

pub fn denorm(desc: &ParamDescriptor, t: f32) -> f32 {
    desc.min + t * (desc.max - desc.min)
}

/// Builds stage `index` with parameters drawn from normalized values.
pub fn build_stage(index: usize, t: &[f32; 8]) -> (&'static str, Box<dyn TapeModule>) {
    match index {
        0 => {
            let mut s = WowFlutter::new();
            s.set_wow_depth(denorm(&wow_flutter::WOW_DEPTH, t[0]));
            s.set_flutter_depth(denorm(&wow_flutter::FLUTTER_DEPTH, t[1]));
            s.set_wow_rate(denorm(&wow_flutter::WOW_RATE, t[2]));
            s.set_flutter_rate(denorm(&wow_flutter::FLUTTER_RATE, t[3]));
            ("wow_flutter", Box::new(s))
        }
        1 => {
            let mut s = HeadBump::new();
            s.set_gain_db(denorm(&head_bump::GAIN, t[0]));
            s.set_frequency(denorm(&head_bump::FREQUENCY, t[1]));
            s.set_mix(denorm(&head_bump::MIX, t[2]));
            ("head_bump", Box::new(s))
        }
        2 => {
            let mut s = Saturation::new();
            s.set_drive_db(denorm(&saturation::DRIVE, t[0]));
            s.set_output_db(denorm(&saturation::OUTPUT, t[1]));
            ("saturation", Box::new(s))
        }
        3 => {
            let mut s = HfLoss::new();
            s.set_cutoff_hz(denorm(&hf_loss::CUTOFF, t[0]));
            ("hf_loss", Box::new(s))
        }
        4 => {
            let mut s = Hiss::with_seed(1);
            s.set_level_dbfs(denorm(&hiss::LEVEL, t[0]));
            s.set_tilt(denorm(&hiss::TILT, t[1]));
            ("hiss", Box::new(s))
        }
        5 => {
            let mut s = Crosstalk::new();
            s.set_amount_db(denorm(&crosstalk::AMOUNT, t[0]));
            ("crosstalk", Box::new(s))
        }
        6 => {
            let mut s = Azimuth::new();
            s.set_jitter_ms(denorm(&azimuth::JITTER, t[0]));
            ("azimuth", Box::new(s))
        }
        7 => {
            let mut s = Dropouts::new();
            s.set_rate_per_min(denorm(&dropouts::RATE, t[0]));
            ("dropouts", Box::new(s))
        }
        8 => {
            let mut s = Compander::new();
            s.set_enabled(t[7] > 0.5);
            s.set_threshold_db(denorm(&compander::THRESHOLD, t[0]));
            s.set_ratio(denorm(&compander::RATIO, t[1]));
            s.set_attack_ms(denorm(&compander::ATTACK, t[2]));
            s.set_release_ms(denorm(&compander::RELEASE, t[3]));
            s.set_knee_db(denorm(&compander::KNEE, t[4]));
            s.set_makeup_db(denorm(&compander::MAKEUP, t[5]));
            ("compander", Box::new(s))
        }
        9 => {
            let mut s = Eq::new();
            s.set_settings(EqSettings {
                low_db: denorm(&eq::LOW_GAIN, t[0]),
                mid_db: denorm(&eq::MID_GAIN, t[1]),
                high_db: denorm(&eq::HIGH_GAIN, t[2]),
                mid_freq_hz: denorm(&eq::MID_FREQ, t[3]),
                mid_q: denorm(&eq::MID_Q, t[4]),
            });
            ("eq", Box::new(s))
        }
        _ => ("meters", Box::new(Meters::new())),
    }
}

/// Default-constructed stage `index`.
pub fn default_stage(index: usize) -> (&'static str, Box<dyn TapeModule>) {
    match index {
        0 => ("wow_flutter", Box::new(WowFlutter::new())),
        1 => ("head_bump", Box::new(HeadBump::new())),
        2 => ("saturation", Box::new(Saturation::new())),
        3 => ("hf_loss", Box::new(HfLoss::new())),
        4 => ("hiss", Box::new(Hiss::new())),
        5 => ("crosstalk", Box::new(Crosstalk::new())),
        6 => ("azimuth", Box::new(Azimuth::new())),
        7 => ("dropouts", Box::new(Dropouts::new())),
        8 => ("compander", Box::new(Compander::new())),
        9 => ("eq", Box::new(Eq::new())),
        _ => ("meters", Box::new(Meters::new())),
    }
}
