use fusebox::{BreakerBuilder, BreakerError};
use std::error::Error;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
struct ServiceError(String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

fn main() -> Result<(), Box<dyn Error>> {
    // Open when the decayed success ratio of recent calls drops below 45%,
    // with a 30 second counter half-life.
    let breaker = BreakerBuilder::<ServiceError>::new()
        .handle_all()
        .min_success_ratio(45.0)
        .half_life(Duration::from_secs(30))
        .break_duration(Duration::from_secs(2))
        .build_ratio()?;

    // Alternate successes and failures; the failure streak at the end
    // drags the ratio below the minimum.
    let outcomes = [true, true, true, false, true, false, false, false, false];

    for (attempt, &ok) in outcomes.iter().enumerate() {
        let result = breaker.call(|| -> Result<String, ServiceError> {
            if ok {
                Ok("Success".to_string())
            } else {
                Err(ServiceError("degraded backend".to_string()))
            }
        });

        match result {
            Ok(value) => println!("Attempt {}: {}", attempt + 1, value),
            Err(BreakerError::Open(_)) => println!("Attempt {}: circuit open", attempt + 1),
            Err(BreakerError::Operation(err)) => println!("Attempt {}: {}", attempt + 1, err),
            Err(err) => println!("Attempt {}: breaker error: {}", attempt + 1, err),
        }
    }

    Ok(())
}
