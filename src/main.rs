use log::{error, info};
use memo_desk::app::{self, AppConfig};
use memo_desk::auth::gate::{BiometricGate, NoBiometrics, Platform};
use memo_desk::utils;

fn main() {
    utils::init_logging();

    let config = AppConfig::load();
    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            error!("Could not open memo store: {e}");
            std::process::exit(1);
        }
    };

    for line in app::launch(&store, &config) {
        info!("{} ({}): {} pending", line.name, line.id, line.pending);
    }

    let gate = BiometricGate::new(NoBiometrics, Platform::Android);
    let available = utils::block_on(gate.is_available());
    info!(
        "Biometric confirmation: {:?}, device support: {}",
        config.gate_policy(),
        if available { "yes" } else { "no" }
    );
}
