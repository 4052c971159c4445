//! Subcommands: each one raises a single lifecycle event or inspects state

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Subcommand;
use tracing::{debug, info};

use deferral_core::domain::{
    LineItem, LineItemId, MembershipEventData, MembershipPostId, OrderId, OrderStatus, ProductId, Surface,
};
use deferral_core::repositories::OrderRepository;
use deferral_core::services::{
    DeferralOrchestrator, DeferralOutcome, DisplayService, Eligibility, EligibilityConfig, LineItemStore,
    MembershipDateSource,
};
use deferral_infrastructure::{
    ConfigSettingsRepository, InMemoryMembershipGateway, InMemoryOrderRepository, InMemoryProductRepository,
    Snapshot, SnapshotStores,
};
use deferral_shared::DeferralConfig;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move an order to a new status and run the status-change hook
    StatusChanged {
        order: OrderId,
        /// Target status slug, `wc-` prefix optional
        #[arg(long)]
        to: String,
        /// Previous status; defaults to the stored one
        #[arg(long)]
        from: Option<String>,
    },
    /// Run the order-created hook for an order already in the snapshot
    OrderCreated { order: OrderId },
    /// Run the membership-created hook
    MembershipCreated {
        #[arg(long)]
        post: Option<MembershipPostId>,
        #[arg(long)]
        order: Option<OrderId>,
        #[arg(long)]
        product: Option<ProductId>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        renewal: bool,
        #[arg(long)]
        upgrade: bool,
    },
    /// Attach a line item to an order and copy the product's static meta onto it
    AddItem {
        order: OrderId,
        #[arg(long)]
        item: LineItemId,
        #[arg(long)]
        product: ProductId,
        #[arg(long)]
        variation: Option<ProductId>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print line item data, display eligibility and audit notes of an order
    Show {
        order: OrderId,
        /// Restrict to one surface
        #[arg(long)]
        surface: Option<String>,
    },
    /// Print the membership linked to an order line and its persisted dates
    Membership {
        order: OrderId,
        #[arg(long)]
        product: ProductId,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::StatusChanged { .. } => "status-changed",
            Command::OrderCreated { .. } => "order-created",
            Command::MembershipCreated { .. } => "membership-created",
            Command::AddItem { .. } => "add-item",
            Command::Show { .. } => "show",
            Command::Membership { .. } => "membership",
        }
    }
}

type Orchestrator = DeferralOrchestrator<
    ConfigSettingsRepository,
    InMemoryProductRepository,
    InMemoryOrderRepository,
    InMemoryMembershipGateway,
>;

type TermDisplay = DisplayService<ConfigSettingsRepository, InMemoryProductRepository, InMemoryOrderRepository>;

/// The wired-up system over one loaded snapshot.
pub struct Host {
    stores: SnapshotStores,
    orchestrator: Orchestrator,
    display: TermDisplay,
}

impl Host {
    pub fn new(stores: SnapshotStores, config: &DeferralConfig) -> Self {
        let settings = Arc::new(ConfigSettingsRepository::new(config));
        let eligibility = EligibilityConfig::new(config.membership_category_slugs.iter().cloned());

        let orchestrator = DeferralOrchestrator::new(
            settings.clone(),
            stores.products.clone(),
            stores.orders.clone(),
            MembershipDateSource::from_option(stores.membership.clone()),
            eligibility.clone(),
        );
        let display = DisplayService::new(
            Eligibility::new(settings, stores.products.clone(), eligibility),
            stores.orders.clone(),
            config.display_date_format.clone(),
        );

        Self {
            stores,
            orchestrator,
            display,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.stores.to_snapshot()
    }

    /// Run one command, writing its report to `out`. Returns whether state changed.
    pub fn run(&self, command: Command, out: &mut impl Write) -> Result<bool> {
        debug!(command = command.name(), "Dispatching command");

        match command {
            Command::StatusChanged { order, to, from } => {
                let new_status = OrderStatus::from_slug(&to);
                let stored = self
                    .stores
                    .orders
                    .set_status(order, new_status.clone())
                    .with_context(|| format!("cannot change status of order {order}"))?;
                let old_status = from.as_deref().map(OrderStatus::from_slug).unwrap_or(stored);

                info!(order_id = order, from = %old_status, to = %new_status, "Order status changed");
                let outcome = self
                    .orchestrator
                    .on_order_status_changed(order, &old_status, &new_status);
                report_outcome(out, &outcome)?;
                Ok(true)
            }
            Command::OrderCreated { order } => {
                let stored = self
                    .stores
                    .orders
                    .find_by_id(order)?
                    .ok_or_else(|| anyhow!("order {order} is not in the snapshot"))?;
                let outcome = self.orchestrator.on_order_created(order, &stored);
                report_outcome(out, &outcome)?;
                Ok(outcome.updated_count() > 0)
            }
            Command::MembershipCreated {
                post,
                order,
                product,
                start_date,
                end_date,
                renewal,
                upgrade,
            } => {
                let data = MembershipEventData {
                    membership_post_id: post,
                    membership_parent_order_id: order,
                    membership_product_id: product,
                    start_date,
                    end_date,
                };
                let outcome = self.orchestrator.on_membership_created(&data, renewal, upgrade);
                report_outcome(out, &outcome)?;
                Ok(outcome.updated_count() > 0)
            }
            Command::AddItem {
                order,
                item,
                product,
                variation,
                name,
            } => {
                let mut line_item = LineItem::new(item, product, variation);
                line_item.name = name.unwrap_or_default();

                if !self.orchestrator.on_line_item_created(order, line_item) {
                    bail!("line item {item} was not added to order {order}");
                }
                writeln!(out, "line item {item} added to order {order}")?;
                Ok(true)
            }
            Command::Show { order, surface } => {
                let surfaces = match surface {
                    Some(slug) => {
                        vec![Surface::from_str(&slug).ok_or_else(|| anyhow!("unknown surface '{slug}'"))?]
                    }
                    None => Surface::ALL.to_vec(),
                };
                self.show(order, &surfaces, out)?;
                Ok(false)
            }
            Command::Membership { order, product } => {
                self.show_membership(order, product, out)?;
                Ok(false)
            }
        }
    }

    fn show(&self, order_id: OrderId, surfaces: &[Surface], out: &mut impl Write) -> Result<()> {
        let order = self
            .stores
            .orders
            .find_by_id(order_id)?
            .ok_or_else(|| anyhow!("order {order_id} is not in the snapshot"))?;

        writeln!(out, "order {} ({})", order.id, order.status())?;
        for item in order.line_items.values() {
            let data = LineItemStore::<InMemoryOrderRepository>::get_line_item_data(item);
            writeln!(out, "  item {} {}", item.id, serde_json::to_string(&data)?)?;
        }

        for surface in surfaces {
            let shown = self.display.displayable_items(order_id, *surface);
            writeln!(out, "{}: {}", surface.as_str(), serde_json::to_string(&shown)?)?;
        }

        writeln!(out, "notes:")?;
        for note in &order.notes {
            writeln!(out, "  {}", note.content)?;
        }
        Ok(())
    }

    fn show_membership(&self, order_id: OrderId, product_id: ProductId, out: &mut impl Write) -> Result<()> {
        let Some(membership) = self.orchestrator.membership().available() else {
            writeln!(out, "membership subsystem unavailable")?;
            return Ok(());
        };

        let Some(record) = membership.get_membership_from_order(order_id, product_id) else {
            writeln!(out, "no membership for order {order_id} product {product_id}")?;
            return Ok(());
        };

        writeln!(out, "membership {}", serde_json::to_string(&record)?)?;
        match membership.get_authoritative_membership_dates(record.post_id) {
            Some(dates) => writeln!(out, "dates {}", serde_json::to_string(&dates)?)?,
            None => writeln!(out, "dates incomplete")?,
        }
        Ok(())
    }
}

fn report_outcome(out: &mut impl Write, outcome: &DeferralOutcome) -> Result<()> {
    writeln!(out, "{outcome:?}")?;
    if let DeferralOutcome::Processed(items) = outcome {
        writeln!(out, "{} of {} line items updated", outcome.updated_count(), items.len())?;
    }
    Ok(())
}
