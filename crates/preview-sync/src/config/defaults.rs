pub fn default_port() -> u16 {
    5555
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}
