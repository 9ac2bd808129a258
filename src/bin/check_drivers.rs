//! Simple utility to check what a run left behind: key count and one driver

use std::env;
use std::time::Duration;

use anyhow::{bail, Result};

use driver_load_bench::client::{BackendExt, ConnectionFactory, ConnectionPool};
use driver_load_bench::config::{ServerAddress, DRIVER_KEY_PREFIX};
use driver_load_bench::dataset::{join_tariffs, Driver};
use driver_load_bench::workload::driver_key;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <host> <port> [driver-id]", args[0]);
        std::process::exit(1);
    }

    let host = &args[1];
    let port: u16 = args[2].parse()?;
    let id: u64 = match args.get(3) {
        Some(s) => s.parse()?,
        None => 1,
    };

    let factory = ConnectionFactory {
        connect_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
        auth_password: env::var("REDISCLI_AUTH").ok(),
        auth_username: None,
    };
    let pool = ConnectionPool::new(ServerAddress::new(host, port), factory, 1);

    println!("DBSIZE: {}", pool.dbsize()?);

    let key = driver_key(DRIVER_KEY_PREFIX, id);
    let reply = pool.call(&["HGETALL", &key])?;
    let Some(fields) = reply.into_field_map() else {
        bail!("Unexpected HGETALL reply for {}", key);
    };
    if fields.is_empty() {
        println!("{}: not found", key);
        return Ok(());
    }

    let driver = Driver::from_fields(&fields);
    println!("{}:", key);
    println!("  location:        {:.6}, {:.6}", driver.location.lat, driver.location.lng);
    println!("  geo_hash:        {}", driver.geo_hash);
    println!("  active_tariffs:  {}", join_tariffs(&driver.active_tariffs));
    println!("  score:           {}", driver.score);
    println!("  active:          {}", driver.active);
    println!("  charge:          {}%", driver.charge);
    println!("  last_updated:    {}", driver.last_updated_time);

    Ok(())
}
