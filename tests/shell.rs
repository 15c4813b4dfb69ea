#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;

use anyhow::Result;
use resortdesk_lib::shell::run_shell;
use resortdesk_lib::Desk;

#[path = "util.rs"]
mod util;

async fn run_script(desk: &mut Desk, script: &str) -> Result<String> {
    let mut out = Vec::new();
    run_shell(desk, Cursor::new(script.as_bytes().to_vec()), &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn books_an_appointment_end_to_end() -> Result<()> {
    let store = util::memory_store().await;
    let mut desk = Desk::open(&store).await?;

    let script = "\
set last_name Ivanov
set first_name Petr
add
tab services
set name Massage
set price 1500
set duration 45
add
tab appointments
options
set guest 1: Ivanov Petr
set service 1
set date 10.06.2024
set time 14:30
add
list
quit
";
    let output = run_script(&mut desk, script).await?;

    assert!(output.contains("Success: Guest #1 added"), "{output}");
    assert!(output.contains("Success: Service #1 added"), "{output}");
    assert!(output.contains("1: Ivanov Petr"), "{output}");
    assert!(output.contains("statuses: Scheduled, Completed, Cancelled"), "{output}");
    assert!(output.contains("Success: Appointment #1 added"), "{output}");
    assert!(output.contains("10.06.2024 14:30 | Scheduled"), "{output}");
    assert_eq!(util::count(&store, "appointments").await, 1);
    Ok(())
}

#[tokio::test]
async fn errors_do_not_stop_the_loop() -> Result<()> {
    let store = util::memory_store().await;
    let mut desk = Desk::open(&store).await?;

    let script = "\
tab services
set name Sauna
set price lots
add
update
bogus
set price 300
set duration 60
add
";
    let output = run_script(&mut desk, script).await?;

    assert!(output.contains("Error: price \"lots\""), "{output}");
    assert!(output.contains("Warning: no service is selected"), "{output}");
    assert!(output.contains("unknown command \"bogus\""), "{output}");
    assert!(output.contains("Success: Service #1 added"), "{output}");
    assert_eq!(util::count(&store, "services").await, 1);
    Ok(())
}

#[tokio::test]
async fn delete_asks_on_the_same_input() -> Result<()> {
    let store = util::memory_store().await;
    let mut desk = Desk::open(&store).await?;

    let script = "\
set last_name Sidorova
add
select 1
delete
n
delete
y
list
";
    let output = run_script(&mut desk, script).await?;

    assert!(output.contains("Delete this guest? [y/N]"), "{output}");
    assert!(output.contains("Cancelled."), "{output}");
    assert!(output.contains("Success: Guest #1 deleted"), "{output}");
    assert!(output.contains("(no guests)"), "{output}");
    assert_eq!(util::count(&store, "guests").await, 0);
    Ok(())
}
