fn main() {
    println!("cargo:rerun-if-changed=config/config.json");
    println!("cargo:rerun-if-changed=config/secrets.json");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
