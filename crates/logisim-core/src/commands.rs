//! Player commands against a [`Simulation`].
//!
//! Each command validates against the committed state, then mutates a
//! working copy inside a [`UnitOfWork`] and commits only if every step
//! succeeded. A rejected command leaves funds, stock, and spikes untouched.

use logisim_ledger::LedgerError;
use logisim_orders::{OrderError, OrderStateMachine, TransferStateMachine};
use logisim_spikes::{SpikeError, price_multiplier};
use logisim_types::{
    LedgerEntryKind, LocationId, LocationType, Order, OrderId, OrderLine, OrderStatus, ProductId,
    ResolvedBy, RouteId, SpikeId, SpikeType, Transfer, TransferId, TransferLine, TransferStatus,
};
use logisim_world::{RouteError, ShortestPath};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::events::{ListenerError, SimEvent};
use crate::simulation::Simulation;
use crate::state::SimulationState;
use crate::tick::PhaseError;
use crate::unit_of_work::UnitOfWork;

/// Errors returned by player commands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// No location with this ID.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// No product with this ID.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    /// No order with this ID.
    #[error("unknown order: {0}")]
    UnknownOrder(OrderId),

    /// No spike with this ID.
    #[error("unknown spike: {0}")]
    UnknownSpike(SpikeId),

    /// Orders must be placed with a vendor.
    #[error("location {0} is not a vendor")]
    NotAVendor(LocationId),

    /// A shipment needs at least one line with a positive quantity.
    #[error("shipment has no lines")]
    EmptyLines,

    /// Source and destination are the same location.
    #[error("source and destination are both {0}")]
    SameLocation(LocationId),

    /// No path between the endpoints.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The shipment is larger than the narrowest route on its path.
    #[error("{requested} units exceeds route capacity ({capacity})")]
    CapacityExceeded {
        /// Bottleneck capacity of the path.
        capacity: u32,
        /// Units requested.
        requested: u64,
    },

    /// The source does not hold enough of a product.
    #[error("insufficient stock of {product} at {location}: need {requested}, have {available}")]
    InsufficientStock {
        /// Source location.
        location: LocationId,
        /// Product short.
        product: ProductId,
        /// Units requested.
        requested: u32,
        /// Units on hand.
        available: u32,
    },

    /// The spike is not active.
    #[error("spike {0} is not active")]
    SpikeNotActive(SpikeId),

    /// The spike type cannot be ended early by the player.
    #[error("{0} spikes cannot be resolved by the player")]
    NotResolvable(SpikeType),

    /// An order or transfer transition was rejected.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The treasury rejected a payment.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A spike effect failed to roll back.
    #[error(transparent)]
    Spike(#[from] SpikeError),

    /// A listener rejected an event.
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// Ending a spike failed for another reason.
    #[error(transparent)]
    Phase(PhaseError),
}

impl CommandError {
    /// Whether the caller can fix the request and try again.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Route(_)
            | Self::CapacityExceeded { .. }
            | Self::InsufficientStock { .. }
            | Self::NotResolvable(_)
            | Self::SpikeNotActive(_)
            | Self::EmptyLines
            | Self::SameLocation(_) => true,
            Self::Ledger(e) => matches!(e, LedgerError::InsufficientFunds { .. }),
            Self::Order(e) => matches!(e, OrderError::Funds(LedgerError::InsufficientFunds { .. })),
            Self::UnknownLocation(_)
            | Self::UnknownProduct(_)
            | Self::UnknownOrder(_)
            | Self::UnknownSpike(_)
            | Self::NotAVendor(_)
            | Self::Spike(_)
            | Self::Listener(_)
            | Self::Phase(_) => false,
        }
    }
}

impl From<PhaseError> for CommandError {
    fn from(error: PhaseError) -> Self {
        match error {
            PhaseError::Spike { source } => Self::Spike(source),
            PhaseError::Listener { source } => Self::Listener(source),
            PhaseError::StateMachine { source } => Self::Order(source),
            other @ (PhaseError::Clock { .. } | PhaseError::Vanished { .. }) => Self::Phase(other),
        }
    }
}

/// One product and quantity in an order or transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    /// Product.
    pub product_id: ProductId,
    /// Units.
    pub quantity: u32,
}

impl LineRequest {
    /// A line of `quantity` units of `product_id`.
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn require_location(
    state: &SimulationState,
    id: LocationId,
) -> Result<LocationType, CommandError> {
    state
        .graph
        .location(id)
        .map(|l| l.location_type)
        .ok_or(CommandError::UnknownLocation(id))
}

fn validate_lines(state: &SimulationState, lines: &[LineRequest]) -> Result<u64, CommandError> {
    if lines.is_empty() || lines.iter().any(|l| l.quantity == 0) {
        return Err(CommandError::EmptyLines);
    }
    for line in lines {
        if !state.products.contains_key(&line.product_id) {
            return Err(CommandError::UnknownProduct(line.product_id));
        }
    }
    Ok(lines.iter().map(|l| u64::from(l.quantity)).sum())
}

/// Shortest path between distinct endpoints whose bottleneck carries
/// `requested` units.
fn routable_path(
    state: &SimulationState,
    source: LocationId,
    target: LocationId,
    requested: u64,
) -> Result<ShortestPath, CommandError> {
    if source == target {
        return Err(CommandError::SameLocation(source));
    }
    let path = state.router().shortest_path(source, target)?;
    if let Some(capacity) = path.bottleneck_capacity
        && requested > u64::from(capacity)
    {
        return Err(CommandError::CapacityExceeded {
            capacity,
            requested,
        });
    }
    Ok(path)
}

fn money(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(2)
}

/// Quoted transit days over `route_ids`, or `None` if any route is missing
/// or inactive.
fn quote_stored_path(state: &SimulationState, route_ids: &[RouteId]) -> Option<u32> {
    let router = state.router();
    route_ids.iter().try_fold(0_u32, |days, id| {
        let route = state.graph.route(*id).filter(|r| r.active)?;
        Some(days.saturating_add(router.quoted_transit_days(route)))
    })
}

impl Simulation {
    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Create a purchase order from `vendor` to `destination` and submit it,
    /// paying goods plus shipping up front.
    ///
    /// Unit prices carry any active price spike for the destination and
    /// product. Shipping is the path's effective cost.
    pub fn place_order(
        &mut self,
        vendor: LocationId,
        destination: LocationId,
        lines: &[LineRequest],
    ) -> Result<OrderId, CommandError> {
        let state = &self.state;
        if require_location(state, vendor)? != LocationType::Vendor {
            return Err(CommandError::NotAVendor(vendor));
        }
        require_location(state, destination)?;
        let requested = validate_lines(state, lines)?;
        let path = routable_path(state, vendor, destination, requested)?;

        let mut order_lines = Vec::with_capacity(lines.len());
        let mut total = money(path.total_cost);
        for line in lines {
            let base = state
                .products
                .get(&line.product_id)
                .map(|p| p.unit_price)
                .ok_or(CommandError::UnknownProduct(line.product_id))?;
            let multiplier = price_multiplier(
                &state.spikes,
                Some(destination),
                Some(line.product_id),
            );
            let unit_price = base
                .checked_mul(Decimal::from_f64_retain(multiplier).unwrap_or(Decimal::ONE))
                .ok_or(LedgerError::ArithmeticOverflow)?
                .round_dp(2);
            total = unit_price
                .checked_mul(Decimal::from(line.quantity))
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(LedgerError::ArithmeticOverflow)?;
            order_lines.push(OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price,
            });
        }

        let day = state.day();
        let mut order = Order {
            id: OrderId::new(),
            vendor_id: vendor,
            destination_id: destination,
            lines: order_lines,
            route_ids: path.route_ids,
            total_cost: total,
            status: OrderStatus::Draft,
            created_day: day,
            delivery_day: None,
        };
        let id = order.id;

        let mut uow = UnitOfWork::begin(&mut self.state);
        let working = uow.state_mut();
        OrderStateMachine::submit(&mut order, &mut working.treasury, day)?;
        working.orders.insert(id, order.clone());
        let mut log = Vec::new();
        self.orchestrator
            .emit(SimEvent::OrderPlaced { order }, working, &mut log)?;
        uow.commit();

        info!(order = %id, %vendor, %destination, %total, units = requested, day, "order placed");
        Ok(id)
    }

    /// Dispatch a pending order. Delivery is due after the quoted transit
    /// days of its path, including any active delay spikes.
    ///
    /// If a route on the stored path has gone inactive, the path is
    /// recomputed over the active network first.
    pub fn ship_order(&mut self, id: OrderId) -> Result<u64, CommandError> {
        let state = &self.state;
        let order = state.orders.get(&id).ok_or(CommandError::UnknownOrder(id))?;
        let day = state.day();

        let (route_ids, transit) = if let Some(days) = quote_stored_path(state, &order.route_ids) {
            (order.route_ids.clone(), days)
        } else {
            let path = routable_path(
                state,
                order.vendor_id,
                order.destination_id,
                order.total_quantity(),
            )?;
            debug!(order = %id, routes = path.route_ids.len(), "order rerouted");
            let days = quote_stored_path(state, &path.route_ids).unwrap_or(path.transit_days);
            (path.route_ids, days)
        };

        let mut uow = UnitOfWork::begin(&mut self.state);
        let working = uow.state_mut();
        let order = working
            .orders
            .get_mut(&id)
            .ok_or(CommandError::UnknownOrder(id))?;
        OrderStateMachine::ship(order, day, transit)?;
        order.route_ids = route_ids;
        let due = order.delivery_day.unwrap_or(day);
        uow.commit();

        info!(order = %id, day, transit, due, "order shipped");
        Ok(due)
    }

    /// Cancel a pending or shipped order and refund it.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<(), CommandError> {
        let day = self.state.day();
        let mut uow = UnitOfWork::begin(&mut self.state);
        let working = uow.state_mut();
        let order = working
            .orders
            .get_mut(&id)
            .ok_or(CommandError::UnknownOrder(id))?;
        OrderStateMachine::cancel(order, &mut working.treasury, day)?;
        let refund = order.total_cost;
        uow.commit();

        info!(order = %id, %refund, day, "order cancelled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Move stock from `source` to `target`. Units leave the source now,
    /// the path's shipping cost is charged now, and the goods arrive after
    /// the quoted transit days.
    pub fn create_transfer(
        &mut self,
        source: LocationId,
        target: LocationId,
        lines: &[LineRequest],
    ) -> Result<TransferId, CommandError> {
        let state = &self.state;
        require_location(state, source)?;
        require_location(state, target)?;
        let requested = validate_lines(state, lines)?;
        let path = routable_path(state, source, target, requested)?;
        let transit = quote_stored_path(state, &path.route_ids).unwrap_or(path.transit_days);
        let fee = money(path.total_cost);
        let day = state.day();

        let mut transfer = Transfer {
            id: TransferId::new(),
            source_id: source,
            target_id: target,
            lines: lines
                .iter()
                .map(|l| TransferLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
            route_ids: path.route_ids,
            total_cost: fee,
            status: TransferStatus::Draft,
            created_day: day,
            delivery_day: None,
        };
        let id = transfer.id;

        let mut uow = UnitOfWork::begin(&mut self.state);
        let working = uow.state_mut();
        for line in lines {
            working
                .remove_stock(source, line.product_id, line.quantity)
                .map_err(|shortfall| CommandError::InsufficientStock {
                    location: source,
                    product: line.product_id,
                    requested: line.quantity,
                    available: shortfall.available,
                })?;
        }
        if fee > Decimal::ZERO {
            working
                .treasury
                .debit(day, LedgerEntryKind::TransferFee, fee, Some(id.into_inner()))?;
        }
        TransferStateMachine::dispatch(&mut transfer, day, transit)?;
        working.transfers.insert(id, transfer);
        uow.commit();

        info!(transfer = %id, %source, %target, units = requested, %fee, transit, day, "transfer dispatched");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Spike resolution
    // -----------------------------------------------------------------------

    /// What ending `id` early would cost today.
    pub fn quote_resolution(&self, id: SpikeId) -> Result<Decimal, CommandError> {
        let spike = self
            .state
            .spikes
            .get(id)
            .ok_or(CommandError::UnknownSpike(id))?;
        if !spike.active {
            return Err(CommandError::SpikeNotActive(id));
        }
        self.orchestrator
            .scheduler()
            .resolution_cost(spike, self.state.day())
            .map_err(|e| match e {
                SpikeError::NotPlayerResolvable(t) => CommandError::NotResolvable(t),
                other => CommandError::Spike(other),
            })
    }

    /// End an active breakdown or blizzard early. Funds are debited, the
    /// effect is rolled back, and any spikes spawned by it end with it.
    /// Returns the amount paid.
    pub fn resolve_spike(&mut self, id: SpikeId) -> Result<Decimal, CommandError> {
        let cost = self.quote_resolution(id)?;
        let day = self.state.day();
        let children = self
            .state
            .spikes
            .ids_where(|s| s.parent_id == Some(id) && !s.is_resolved());

        let mut uow = UnitOfWork::begin(&mut self.state);
        let working = uow.state_mut();
        working.treasury.debit(
            day,
            LedgerEntryKind::SpikeResolution,
            cost,
            Some(id.into_inner()),
        )?;
        if let Some(spike) = working.spikes.get_mut(id) {
            spike.resolution_cost = Some(cost);
        }
        let mut log = Vec::new();
        self.orchestrator
            .end_spike(working, id, day, ResolvedBy::Player, &mut log)?;
        for child in &children {
            self.orchestrator
                .end_spike(working, *child, day, ResolvedBy::Player, &mut log)?;
        }
        uow.commit();

        info!(spike = %id, %cost, children = children.len(), day, "spike resolved by player");
        Ok(cost)
    }
}
