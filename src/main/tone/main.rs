use colored::Colorize;
use log::info;
use selflib::audio::CpalBackend;
use selflib::player::{exit_code, play};
use selflib::settings::Settings;
use selflib::utils::init_logger;

fn main() {
    init_logger();

    let settings = Settings::get_default_settings();
    let tone = settings.get_tone_spec();
    info!(
        "TONE: {} Hz at {} Hz, {} channel(s), {} frame buffer",
        tone.frequency,
        settings.get_sample_rate(),
        settings.get_channels(),
        settings.get_buffer_size()
    );

    let mut backend = CpalBackend::new();
    let result = play(&mut backend, &settings);

    match &result {
        Ok(report) => {
            let audio = report.audio_duration(settings.get_sample_rate(), settings.get_channels());
            info!(
                "TONE: {} callbacks, {:.2}s of audio, peak {}",
                report.invocations,
                audio.as_secs_f64(),
                report.peak
            );
        }
        Err(err) => println!("{}", err.to_string().red()),
    }

    std::process::exit(exit_code(&result));
}
