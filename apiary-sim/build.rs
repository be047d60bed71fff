//! Build script for apiary-sim
//!
//! Validates the embedded sim.toml at compile time so a broken default
//! never reaches the runner.

use std::fs;
use std::path::Path;

const DEVICE_KINDS: [&str; 2] = ["sampler", "focuser"];

const FOCUSER_BUILDS: [&str; 5] = [
    "low_power_hyperstar",
    "low_power_hyperstar_microstep",
    "traditional",
    "unit_test_hyperstar",
    "unit_test_traditional",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate sim.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sim.toml");

    let config_path = Path::new("sim.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sim.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The runner embeds sim.toml as its default configuration.        ║\n\
            ║  Please create one in the apiary-sim directory.                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read sim.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in sim.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    validate_required_sections(&config);
    validate_device(&config);
    validate_network(&config);
    validate_sampler(&config);
    validate_focuser(&config);

    println!("cargo:warning=sim.toml validated successfully");
}

/// Abort the build with a boxed list of problems
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| {
                let truncated = if e.len() > 62 {
                    format!("{}...", &e[..59])
                } else {
                    e.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn check(title: &str, errors: Vec<String>) {
    if !errors.is_empty() {
        fail(title, &errors);
    }
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors = ["device", "network"]
        .iter()
        .filter(|section| config.get(*section).is_none())
        .map(|section| format!("Missing [{}] section", section))
        .collect();

    check("Missing required sections in sim.toml", errors);
}

fn validate_device(config: &toml::Value) {
    let Some(device) = config.get("device").and_then(|d| d.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    match device.get("kind") {
        Some(toml::Value::String(kind)) => {
            if !DEVICE_KINDS.contains(&kind.as_str()) {
                errors.push(format!("[device] kind must be 'sampler' or 'focuser', not '{}'", kind));
            }
        }
        Some(_) => errors.push("[device] kind must be a string".to_string()),
        None => errors.push("[device] missing 'kind'".to_string()),
    }

    if let Some(flag) = device.get("report_temperature") {
        if flag.as_bool().is_none() {
            errors.push("[device] report_temperature must be true or false".to_string());
        }
    }

    check("Invalid device configuration", errors);
}

fn validate_network(config: &toml::Value) {
    let Some(network) = config.get("network").and_then(|n| n.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    match network.get("port") {
        Some(toml::Value::Integer(port)) => {
            if *port < 1 || *port > 65535 {
                errors.push("[network] port must be 1-65535".to_string());
            }
        }
        Some(_) => errors.push("[network] port must be an integer".to_string()),
        None => {}
    }

    if let Some(bind) = network.get("bind") {
        match bind.as_str() {
            Some(addr) if addr.parse::<std::net::IpAddr>().is_ok() => {}
            _ => errors.push("[network] bind must be an IP address".to_string()),
        }
    }

    check("Invalid network configuration", errors);
}

fn validate_sampler(config: &toml::Value) {
    let Some(sampler) = config.get("sampler").and_then(|s| s.as_table()) else {
        return;
    };

    let mut errors = Vec::new();
    let mut read = |key: &str| match sampler.get(key) {
        Some(toml::Value::Integer(value)) if *value > 0 && *value <= i64::from(u32::MAX) => {
            Some(*value)
        }
        Some(_) => {
            errors.push(format!("[sampler] {} must be a positive 32-bit integer", key));
            None
        }
        None => None,
    };

    let interval_us = read("sample_interval_us");
    let window_ms = read("window_ms");
    let session_ms = read("session_ms");

    if let (Some(interval_us), Some(window_ms)) = (interval_us, window_ms) {
        if interval_us >= window_ms * 1000 {
            errors.push("[sampler] sample_interval_us must be shorter than window_ms".to_string());
        }
    }
    if let (Some(window_ms), Some(session_ms)) = (window_ms, session_ms) {
        if session_ms < window_ms {
            errors.push("[sampler] session_ms must be at least window_ms".to_string());
        }
    }

    check("Invalid sampler configuration", errors);
}

fn validate_focuser(config: &toml::Value) {
    let Some(focuser) = config.get("focuser").and_then(|f| f.as_table()) else {
        return;
    };

    let mut errors = Vec::new();

    if let Some(build) = focuser.get("build") {
        match build.as_str() {
            Some(name) if FOCUSER_BUILDS.contains(&name) => {}
            Some(name) => errors.push(format!("[focuser] unknown build '{}'", name)),
            None => errors.push("[focuser] build must be a string".to_string()),
        }
    }

    if let Some(start) = focuser.get("start_position") {
        if start.as_integer().is_none() {
            errors.push("[focuser] start_position must be an integer".to_string());
        }
    }

    check("Invalid focuser configuration", errors);
}
