//! Chromium backend against a local HTTP origin.
//!
//! Needs a Chromium binary; set `WEBPROBE_CHROME_E2E=1` to run.

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use webprobe::{AutomationDriver, ChromiumDriver, Cookie, DriverConfig};

const PAGE: &str = "<html><head><title>cookies</title></head><body></body></html>";

fn chrome_e2e_enabled() -> bool {
    std::env::var("WEBPROBE_CHROME_E2E").is_ok()
}

macro_rules! require_chrome_e2e {
    () => {
        if !chrome_e2e_enabled() {
            eprintln!("[SKIP] {} requires WEBPROBE_CHROME_E2E=1", module_path!());
            return;
        }
    };
}

/// Serve one page that sets an HttpOnly cookie and a cookie scoped to another path
fn spawn_cookie_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = [0_u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 200 OK\r\n\
                 Set-Cookie: sid=server-session; HttpOnly; Path=/\r\n\
                 Set-Cookie: scoped=elsewhere; Path=/other\r\n\
                 Content-Type: text/html\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{PAGE}",
                PAGE.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/")
}

fn names(driver: &ChromiumDriver) -> Vec<String> {
    driver.cookies().unwrap().into_iter().map(|c| c.name).collect()
}

#[test]
fn test_cookie_store_includes_http_only_and_other_paths() {
    require_chrome_e2e!();
    let url = spawn_cookie_server();
    let driver = ChromiumDriver::launch(DriverConfig::default()).unwrap();
    driver.navigate(&url).unwrap();

    driver.add_cookie(&Cookie::new("testCookie", "testValue")).unwrap();
    let seen = names(&driver);
    for name in ["sid", "scoped", "testCookie"] {
        assert!(seen.iter().any(|n| n == name), "{name} missing from {seen:?}");
    }

    driver.delete_cookie("scoped").unwrap();
    assert!(!names(&driver).iter().any(|n| n == "scoped"));

    driver.delete_all_cookies().unwrap();
    assert!(names(&driver).is_empty(), "left over: {:?}", names(&driver));
    driver.quit().unwrap();
}
