//! desk-runner: headless driver for the service-complaint desk.
//!
//! Usage:
//!   desk-runner --db desk.db --data-dir ./data --seed-demo
//!   desk-runner --db desk.db --ipc-mode

use anyhow::Result;
use servicedesk_core::{
    complaint::{ComplaintRecord, Priority, WorkingStatus},
    config::DeskConfig,
    desk::{ComplaintDesk, CompletionForm, NewComplaint},
    notification::LogTransport,
    role::Role,
    store::DeskStore,
    upload::{DirPhotoStore, PhotoFile},
    visibility::ComplaintView,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    RegisterCustomer {
        name: String,
        email: String,
        phone: String,
    },
    RegisterEmployee {
        name: String,
        role: Role,
        email: String,
        phone: String,
    },
    FileComplaint {
        actor_id: String,
        customer_id: String,
        description: String,
        priority: Priority,
        #[serde(default)]
        mechanic_id: Option<String>,
    },
    Assign {
        actor_id: String,
        complaint_id: String,
        mechanic_id: String,
    },
    Accept {
        mechanic_id: String,
        complaint_id: String,
    },
    Reject {
        mechanic_id: String,
        complaint_id: String,
        reason: String,
    },
    Start {
        mechanic_id: String,
        complaint_id: String,
    },
    Complete {
        mechanic_id: String,
        complaint_id: String,
        description: String,
        amount: f64,
        payment_method: String,
    },
    Remove {
        actor_id: String,
        complaint_id: String,
    },
    List {
        viewer_id: String,
        #[serde(default)]
        pending_only: bool,
    },
    GetState,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    customers: i64,
    employees: i64,
    complaints: i64,
    pending: i64,
    accepted: i64,
    processing: i64,
    completed: i64,
    rejected: i64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed_demo = args.iter().any(|a| a == "--seed-demo");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("service-complaint desk — desk-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = if db == ":memory:" {
        DeskStore::in_memory()?
    } else {
        DeskStore::open(db)?
    };
    store.migrate()?;

    let config = match DeskConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("falling back to default config: {e}");
            DeskConfig::default()
        }
    };
    let photos = DirPhotoStore::new(Path::new(data_dir).join("photos"));
    let desk = ComplaintDesk::new(store, config, Box::new(LogTransport), Box::new(photos));

    if seed_demo || !ipc_mode {
        seed_demo_desk(&desk)?;
    }

    if ipc_mode {
        run_ipc_loop(&desk)?;
    } else {
        print_summary(&desk)?;
    }

    Ok(())
}

fn run_ipc_loop(desk: &ComplaintDesk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        match handle_command(desk, cmd) {
            Ok(reply) => writeln!(stdout, "{}", reply)?,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(desk: &ComplaintDesk, cmd: IpcCommand) -> Result<String> {
    let reply = match cmd {
        IpcCommand::RegisterCustomer { name, email, phone } => {
            let customer = desk.register_customer(name, email, phone)?;
            serde_json::to_string(&customer)?
        }
        IpcCommand::RegisterEmployee {
            name,
            role,
            email,
            phone,
        } => {
            let employee = desk.register_employee(name, role, email, phone)?;
            serde_json::to_string(&employee)?
        }
        IpcCommand::FileComplaint {
            actor_id,
            customer_id,
            description,
            priority,
            mechanic_id,
        } => {
            let complaint = desk.file_complaint(
                &actor_id,
                NewComplaint {
                    customer_id,
                    description,
                    priority,
                    assigned_mechanic_id: mechanic_id,
                },
            )?;
            serde_json::to_string(&complaint)?
        }
        IpcCommand::Assign {
            actor_id,
            complaint_id,
            mechanic_id,
        } => {
            let complaint = desk.assign_mechanic(&actor_id, &complaint_id, &mechanic_id)?;
            serde_json::to_string(&complaint)?
        }
        IpcCommand::Accept {
            mechanic_id,
            complaint_id,
        } => serde_json::to_string(&desk.accept_complaint(&mechanic_id, &complaint_id)?)?,
        IpcCommand::Reject {
            mechanic_id,
            complaint_id,
            reason,
        } => serde_json::to_string(&desk.reject_complaint(&mechanic_id, &complaint_id, reason)?)?,
        IpcCommand::Start {
            mechanic_id,
            complaint_id,
        } => serde_json::to_string(&desk.start_work(&mechanic_id, &complaint_id)?)?,
        IpcCommand::Complete {
            mechanic_id,
            complaint_id,
            description,
            amount,
            payment_method,
        } => {
            let complaint = desk.complete_complaint(
                &mechanic_id,
                &complaint_id,
                CompletionForm {
                    description,
                    photos: Vec::new(),
                    amount,
                    payment_method,
                },
            )?;
            serde_json::to_string(&complaint)?
        }
        IpcCommand::Remove {
            actor_id,
            complaint_id,
        } => {
            desk.remove_complaint(&actor_id, &complaint_id)?;
            serde_json::json!({ "removed": complaint_id }).to_string()
        }
        IpcCommand::List {
            viewer_id,
            pending_only,
        } => {
            let view = if pending_only {
                ComplaintView::PendingOnly
            } else {
                ComplaintView::All
            };
            let complaints: Vec<ComplaintRecord> = desk.complaints_for(&viewer_id, view)?;
            serde_json::to_string(&complaints)?
        }
        IpcCommand::GetState => serde_json::to_string(&build_ui_state(desk)?)?,
        IpcCommand::Quit => String::new(),
    };
    Ok(reply)
}

fn build_ui_state(desk: &ComplaintDesk) -> Result<UiState> {
    Ok(UiState {
        customers: desk.store.customer_count()?,
        employees: desk.store.employee_count()?,
        complaints: desk.store.complaint_count()?,
        pending: desk.store.status_count(WorkingStatus::Pending)?,
        accepted: desk.store.status_count(WorkingStatus::Accepted)?,
        processing: desk.store.status_count(WorkingStatus::Processing)?,
        completed: desk.store.status_count(WorkingStatus::Completed)?,
        rejected: desk.store.status_count(WorkingStatus::Rejected)?,
    })
}

/// A small fixed roster plus two complaints walked through the
/// lifecycle, so a fresh database has something to look at.
fn seed_demo_desk(desk: &ComplaintDesk) -> Result<()> {
    let coordinator = desk.register_employee(
        "Dana Reyes".into(),
        Role::Coordinator,
        "dana@desk.example".into(),
        "+1-555-0100".into(),
    )?;
    let mechanic = desk.register_employee(
        "Lee Okafor".into(),
        Role::Mechanic,
        "lee@desk.example".into(),
        "+1-555-0101".into(),
    )?;
    let second_mechanic = desk.register_employee(
        "Sam Idris".into(),
        Role::Mechanic,
        "sam@desk.example".into(),
        "+1-555-0102".into(),
    )?;
    desk.register_employee(
        "Ava Chen".into(),
        Role::Admin,
        "ava@desk.example".into(),
        "+1-555-0103".into(),
    )?;

    let customer = desk.register_customer(
        "Noor Haddad".into(),
        "noor@example.com".into(),
        "+1-555-0199".into(),
    )?;
    let second_customer = desk.register_customer(
        "Ravi Patel".into(),
        "ravi@example.com".into(),
        "+1-555-0198".into(),
    )?;

    let first = desk.file_complaint(
        &coordinator.employee_id,
        NewComplaint {
            customer_id: customer.customer_id.clone(),
            description: "Boiler drops pressure overnight".into(),
            priority: Priority::High,
            assigned_mechanic_id: Some(mechanic.employee_id.clone()),
        },
    )?;
    desk.accept_complaint(&mechanic.employee_id, &first.complaint_id)?;
    desk.start_work(&mechanic.employee_id, &first.complaint_id)?;
    desk.complete_complaint(
        &mechanic.employee_id,
        &first.complaint_id,
        CompletionForm {
            description: "Replaced the expansion vessel and re-pressurized".into(),
            photos: vec![PhotoFile {
                file_name: "vessel-after.jpg".into(),
                bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            }],
            amount: 140.0,
            payment_method: "card".into(),
        },
    )?;

    let second = desk.file_complaint(
        &coordinator.employee_id,
        NewComplaint {
            customer_id: second_customer.customer_id,
            description: "Radiator valve whistles under load".into(),
            priority: Priority::Low,
            assigned_mechanic_id: Some(second_mechanic.employee_id.clone()),
        },
    )?;
    desk.reject_complaint(
        &second_mechanic.employee_id,
        &second.complaint_id,
        "Valve model is out of service scope; needs the plumbing team".into(),
    )?;

    log::info!("demo roster seeded");
    Ok(())
}

fn print_summary(desk: &ComplaintDesk) -> Result<()> {
    let state = build_ui_state(desk)?;
    println!("=== DESK SUMMARY ===");
    println!("  customers:   {}", state.customers);
    println!("  employees:   {}", state.employees);
    println!("  complaints:  {}", state.complaints);
    println!("    pending:    {}", state.pending);
    println!("    accepted:   {}", state.accepted);
    println!("    processing: {}", state.processing);
    println!("    completed:  {}", state.completed);
    println!("    rejected:   {}", state.rejected);
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
