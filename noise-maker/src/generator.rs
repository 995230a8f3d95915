use chrono::Local;
use rand::{Rng, seq::IndexedRandom};

const METHODS: [(&str, u8); 3] = [("GET", 12), ("POST", 4), ("HEAD", 1)];
const PATHS: [(&str, u8); 8] = [
    ("/", 10),
    ("/accounts/login/", 10),
    ("/dashboard/", 30),
    ("/search/?q=widgets", 15),
    ("/search/?q=gadgets&page=2", 10),
    ("/reports/export/?fmt=csv", 5),
    ("/i/51764/lock/", 10),
    ("/api/v1/orders/", 20),
];
const STATUS: [(u16, u8); 6] = [
    (200, 80),
    (302, 10),
    (403, 5),
    (404, 5),
    (499, 6),
    (504, 2),
];
const USER_AGENTS: [(&str, u8); 4] = [
    (
        "Mozilla/5.0 (Windows NT 5.1; rv:2.0.1) Gecko/20100101 Firefox/4.0.1",
        10,
    ),
    (
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/534.24 (KHTML, like Gecko) Chrome/11.0.696.57 Safari/534.24",
        10,
    ),
    ("Opera/9.80 (X11; Linux i686; U; en) Presto/2.8.131 Version/11.10", 2),
    ("curl/7.21.0 (x86_64-pc-linux-gnu)", 1),
];
// Share of answered requests whose upstream is slow.
const SLOW_RATIO: f64 = 0.1;

pub fn generate_request_times_log<R: Rng + ?Sized>(rng: &mut R) -> String {
    let ip = format!(
        "10.{}.{}.{}",
        rng.random_range(0..256),
        rng.random_range(0..256),
        rng.random_range(1..255)
    );
    let timestamp = Local::now().format("%d/%b/%Y:%H:%M:%S %z");
    let method = METHODS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let path = PATHS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let user_agent = USER_AGENTS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let status = STATUS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let session = if rng.random_bool(0.7) {
        format!("{:032x}", rng.random::<u128>())
    } else {
        "-".to_string()
    };

    // nginx writes `-` for the upstream fields when it stopped waiting.
    let (upstream_time, request_time, upstream_status) = match status {
        499 | 504 => {
            let request_time = rng.random_range(0.1..15.0);
            ("-".to_string(), request_time, "-".to_string())
        }
        _ => {
            let upstream_time = if rng.random_bool(SLOW_RATIO) {
                rng.random_range(7.0..30.0)
            } else {
                rng.random_range(0.001..1.0)
            };
            let overhead = rng.random_range(0.0..0.01);
            (
                format!("{upstream_time:.3}"),
                upstream_time + overhead,
                status.to_string(),
            )
        }
    };

    format!(
        "IP={ip},TL={timestamp},DN=foo.bar.com,RQ={method} {path} HTTP/1.1,HR=-,\
         HU={user_agent},CS={session},UT={upstream_time},RT={request_time:.3},\
         US={upstream_status},SC={status}"
    )
}
