fn main() {
    println!("cargo:rerun-if-env-changed=HAZARDMON_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=HAZARDMON_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=HAZARDMON_API_KEY");
    println!("cargo:rerun-if-env-changed=HAZARDMON_HOST");

    // Only the firmware build needs the ESP-IDF environment; host tests skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
