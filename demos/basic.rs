use fusebox::{BreakerBuilder, BreakerError};
use std::error::Error;
use std::fmt;
use std::thread;
use std::time::Duration;

// Custom error type that implements Error trait
#[derive(Debug)]
struct ServiceError(String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

fn main() -> Result<(), Box<dyn Error>> {
    // Break after 3 handled faults, stay open for 2 seconds
    let breaker = BreakerBuilder::<ServiceError>::new()
        .handle_all()
        .threshold(3)
        .break_duration(Duration::from_secs(2))
        .on_break(|fault| println!("  >> circuit opened by: {}", fault))
        .build()?;

    let mut counter = 0u32;
    let mut call_service = move || -> Result<String, ServiceError> {
        counter += 1;
        if counter <= 5 {
            // The first few calls fail to demonstrate the trip
            Err(ServiceError("external service unavailable".to_string()))
        } else {
            Ok("Success".to_string())
        }
    };

    for attempt in 1..=12 {
        println!("Attempt {}:", attempt);

        match breaker.call(&mut call_service) {
            Ok(result) => println!("  call succeeded: {}", result),
            Err(BreakerError::Open(cause)) => {
                println!(
                    "  circuit open (last fault: {}), backing off...",
                    cause.map(|c| c.to_string()).unwrap_or_default()
                );
                thread::sleep(Duration::from_millis(500));
            }
            Err(BreakerError::Operation(err)) => println!("  call failed: {}", err),
            Err(err) => println!("  breaker error: {}", err),
        }
    }

    Ok(())
}
