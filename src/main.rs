use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crmdesk::api::{EmailMessage, dashboard::DEFAULT_PERIOD};
use crmdesk::interaction::ViewScope;
use crmdesk::model::{ActivityBody, ActivityDraft, DealStage, ParentRef, RegisterForm, UserProfile};
use crmdesk::session::{RouteDecision, guard_route};
use crmdesk::{Crm, CrmConfig, EntityStore, ListPreset, Page, Record, RecordFields, RecordId};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crmdesk")]
#[command(about = "Operator console for the CRM client core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        industry: String,
        #[arg(long, default_value = "")]
        country: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Dashboard {
        #[arg(long, default_value = DEFAULT_PERIOD)]
        period: String,
    },
    Leads(ListArgs),
    Companies(ListArgs),
    Deals(ListArgs),
    Tickets(ListArgs),
    /// Move a deal to another pipeline stage.
    DealStage {
        id: RecordId,
        stage: DealStage,
    },
    /// Log a note, or a call with `--call`, against a record.
    LogActivity {
        parent: ParentKind,
        id: RecordId,
        #[arg(long, default_value = "")]
        note: String,
        /// Call outcome; logs a call instead of a note.
        #[arg(long)]
        call: Option<String>,
        /// Call date, defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// List the activities logged against a record.
    Activities {
        parent: ParentKind,
        id: RecordId,
    },
    SendEmail {
        #[arg(long)]
        lead_id: RecordId,
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ParentKind {
    Lead,
    Company,
    Deal,
    Ticket,
}

impl ParentKind {
    fn parent(self, id: RecordId) -> ParentRef {
        match self {
            ParentKind::Lead => ParentRef::lead(id),
            ParentKind::Company => ParentRef::company(id),
            ParentKind::Deal => ParentRef::deal(id),
            ParentKind::Ticket => ParentRef::ticket(id),
        }
    }
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value = "")]
    search: String,
    /// `field=value`; repeatable.
    #[arg(long = "filter")]
    filters: Vec<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = CrmConfig::from_env().context("failed to load configuration")?;
    let crm = Crm::open(config).context("failed to open CRM workspace")?;

    match cli.command {
        Command::Register {
            email,
            password,
            first_name,
            last_name,
            phone,
            company,
            industry,
            country,
        } => {
            let profile = UserProfile {
                email,
                first_name,
                last_name,
                phone,
                company,
                industry,
                country,
                ..UserProfile::default()
            };
            crm.sessions
                .register(&RegisterForm::new(profile, password))
                .await
                .context("registration failed")?;
            println!("Registered. You can now log in.");
        }
        Command::Login { email, password } => {
            let session = crm
                .sessions
                .login(&email, &password)
                .await
                .context("login failed")?;
            println!("Logged in as {}", session.user.display_name());
        }
        Command::Logout => {
            crm.sessions.logout();
            println!("Logged out.");
        }
        Command::Whoami => {
            require_login(&crm)?;
            let session = crm.sessions.require()?;
            println!("{} <{}>", session.user.display_name(), session.user.email);
        }
        Command::Dashboard { period } => {
            require_login(&crm)?;
            let view = ViewScope::new();
            let handle = view.handle();
            let dashboard = crm.dashboard.clone();
            let load =
                tokio::spawn(async move { handle.run(dashboard.summary(&period)).await });

            tokio::select! {
                loaded = load => {
                    if let Some(summary) = loaded.context("dashboard task failed")? {
                        for card in summary.stats {
                            println!("{:<20} {}", card.title, card.value);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    drop(view);
                    println!("Cancelled.");
                }
            }
        }
        Command::Leads(args) => {
            require_login(&crm)?;
            list(&crm, &crm.leads, ListPreset::LEADS, &args, &["id", "name", "email", "phone", "status", "owner", "created"])?;
        }
        Command::Companies(args) => {
            require_login(&crm)?;
            list(&crm, &crm.companies, ListPreset::COMPANIES, &args, &["id", "name", "domain", "industry", "city", "country", "status"])?;
        }
        Command::Deals(args) => {
            require_login(&crm)?;
            list(&crm, &crm.deals, ListPreset::DEALS, &args, &["id", "name", "stage", "amount", "owner", "closeDate", "priority"])?;
        }
        Command::Tickets(args) => {
            require_login(&crm)?;
            list(&crm, &crm.tickets, ListPreset::TICKETS, &args, &["id", "title", "status", "source", "priority", "owner", "created"])?;
        }
        Command::DealStage { id, stage } => {
            require_login(&crm)?;
            let deal = crm.move_deal(id, stage).await?;
            println!("Deal {} is now in {}", deal.id, deal.stage);
        }
        Command::LogActivity {
            parent,
            id,
            note,
            call,
            date,
        } => {
            require_login(&crm)?;
            let body = match call {
                Some(outcome) => ActivityBody::Call {
                    outcome,
                    date: date.unwrap_or_else(|| {
                        chrono::Local::now().format("%Y-%m-%d").to_string()
                    }),
                    time: chrono::Local::now().format("%H:%M").to_string(),
                    note,
                },
                None => ActivityBody::Note { note },
            };
            let activity = crm
                .log_activity(ActivityDraft::new(parent.parent(id), body))
                .await?;
            println!("Logged {:?} #{}", activity.kind(), activity.id);
        }
        Command::Activities { parent, id } => {
            require_login(&crm)?;
            for activity in crm.activities.for_parent(parent.parent(id))? {
                println!(
                    "#{} {:?} | {} | {}",
                    activity.id,
                    activity.kind(),
                    activity.created,
                    activity.body.summary()
                );
            }
        }
        Command::SendEmail {
            lead_id,
            to,
            subject,
            body,
        } => {
            require_login(&crm)?;
            let message = EmailMessage {
                lead_id,
                to,
                subject,
                body,
            };
            crm.email
                .send(&message)
                .await
                .map_err(|failure| anyhow!(failure.message))?;
            println!("Email sent successfully!");
        }
    }

    Ok(())
}

fn require_login(crm: &Crm) -> Result<()> {
    match guard_route(&crm.sessions) {
        RouteDecision::Render => Ok(()),
        RouteDecision::Redirect(route) => {
            debug!(route, "Protected command without a session");
            bail!("not signed in; run `crmdesk login` first")
        }
    }
}

fn list<R: Record>(
    crm: &Crm,
    store: &EntityStore<R>,
    preset: ListPreset,
    args: &ListArgs,
    columns: &[&str],
) -> Result<()> {
    let mut query = crm.list_query(preset).search(args.search.as_str()).page(args.page);
    for raw in &args.filters {
        let (field, value) = raw
            .split_once('=')
            .with_context(|| format!("filter '{}' must look like field=value", raw))?;
        let field = field.trim();
        let mode = preset.mode_for(field).with_context(|| {
            format!(
                "cannot filter on '{}'; choose one of: {}",
                field,
                preset.filterable().collect::<Vec<_>>().join(", ")
            )
        })?;
        query = query.filter(field, value.trim(), mode);
    }

    let page = store.query(&query)?;
    print_page(&page, columns);
    Ok(())
}

fn print_page<R: RecordFields>(page: &Page<R>, columns: &[&str]) {
    println!("{}", columns.join(" | "));
    for row in &page.rows {
        let cells = columns
            .iter()
            .map(|column| row.field_text(column).unwrap_or_default())
            .collect::<Vec<_>>();
        println!("{}", cells.join(" | "));
    }
    println!(
        "page {} of {} ({} matching)",
        page.page,
        page.page_count.max(1),
        page.total
    );
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CRMDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("crmdesk=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
