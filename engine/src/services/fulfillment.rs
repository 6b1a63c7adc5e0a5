//! Fulfillment engine: reconciles NEW orders against the catalog snapshot
//!
//! Orders are handled one at a time, oldest first. An order is accepted only
//! when every resolvable item can be served from current stock; otherwise it
//! is backordered in full and no stock moves. Later orders see the stock left
//! by earlier ones. The first failed request stops the run without undoing
//! what was already applied. Stock only moves together with the order's move
//! to PROCESSING, so an aborted run never holds decremented stock for an
//! order still in NEW.

use indexmap::IndexMap;
use serde::Deserialize;
use shared::{Catalog, Order, OrderState};
use thiserror::Error;

use crate::error::{AppError, AppResult};
use crate::external::{BackorderedItem, InventoryLevel, MarketplaceRequest, RequestSink};

/// What to do with an item whose option is not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedItemPolicy {
    /// Log the item and decide the order on its remaining items
    #[default]
    SkipItem,
    /// Treat the item as out of stock, which backorders the order
    BackorderOrder,
}

/// Outcome of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    Backordered,
}

/// Decision taken for one order during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDecision {
    pub order_id: String,
    pub disposition: Disposition,
    /// Items whose option could not be resolved
    pub unresolved_items: Vec<String>,
}

/// Stock change for one option of an accepted order
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decrement {
    product_id: String,
    option_id: String,
    sku: String,
    new_quantity: u32,
}

/// Result of checking an order against the catalog, before any side effect
#[derive(Debug, Clone, PartialEq, Eq)]
enum Evaluation {
    Accept { decrements: Vec<Decrement> },
    Backorder { items: Vec<BackorderedItem> },
}

/// State of a run: the snapshot as updated so far plus what was sent
#[derive(Debug, Clone)]
pub struct FulfillmentRun {
    pub catalog: Catalog,
    pub orders: Vec<Order>,
    pub decisions: Vec<OrderDecision>,
    /// Requests acknowledged by the sink, in send order
    pub issued: Vec<MarketplaceRequest>,
}

impl FulfillmentRun {
    pub fn accepted(&self) -> usize {
        self.count(Disposition::Accepted)
    }

    pub fn backordered(&self) -> usize {
        self.count(Disposition::Backordered)
    }

    fn count(&self, disposition: Disposition) -> usize {
        self.decisions
            .iter()
            .filter(|decision| decision.disposition == disposition)
            .count()
    }
}

/// A run stopped at a failed request.
///
/// `run` holds the snapshot as it was at the failure: earlier orders keep
/// their new states and stock levels. An order whose accept request failed
/// is already PROCESSING with its stock taken, and has no entry in
/// `run.decisions`.
#[derive(Debug, Error)]
#[error("Fulfillment aborted at order {order_id}: {source}")]
pub struct FulfillmentAborted {
    pub order_id: String,
    #[source]
    pub source: AppError,
    pub run: Box<FulfillmentRun>,
}

/// Fulfillment engine
#[derive(Debug, Clone, Copy, Default)]
pub struct FulfillmentEngine {
    policy: UnresolvedItemPolicy,
}

impl FulfillmentEngine {
    pub fn new(policy: UnresolvedItemPolicy) -> Self {
        Self { policy }
    }

    /// Decide every NEW order, mutate the snapshot and send the requests.
    pub async fn process<S>(
        &self,
        mut catalog: Catalog,
        mut orders: Vec<Order>,
        sink: &mut S,
    ) -> Result<FulfillmentRun, FulfillmentAborted>
    where
        S: RequestSink + ?Sized,
    {
        let pending = pending_orders(&orders);
        tracing::info!(pending = pending.len(), total = orders.len(), "processing new orders");

        let mut decisions = Vec::with_capacity(pending.len());
        let mut issued = Vec::new();

        for index in pending {
            let order_id = orders[index].id.clone();
            let outcome = self
                .fulfil(&mut catalog, &mut orders[index], sink, &mut issued)
                .await;
            match outcome {
                Ok(decision) => decisions.push(decision),
                Err(source) => {
                    tracing::error!(order_id = %order_id, code = source.code(), error = %source, "fulfillment aborted");
                    return Err(FulfillmentAborted {
                        order_id,
                        source,
                        run: Box::new(FulfillmentRun {
                            catalog,
                            orders,
                            decisions,
                            issued,
                        }),
                    });
                }
            }
        }

        let run = FulfillmentRun {
            catalog,
            orders,
            decisions,
            issued,
        };
        tracing::info!(
            accepted = run.accepted(),
            backordered = run.backordered(),
            requests = run.issued.len(),
            "fulfillment finished"
        );
        Ok(run)
    }

    /// Handle one order.
    ///
    /// Accept: inventory update, local decrement and PROCESSING, then the
    /// accept request. Backorder: availability request, then BACKORDERED.
    async fn fulfil<S>(
        &self,
        catalog: &mut Catalog,
        order: &mut Order,
        sink: &mut S,
        issued: &mut Vec<MarketplaceRequest>,
    ) -> AppResult<OrderDecision>
    where
        S: RequestSink + ?Sized,
    {
        let (evaluation, unresolved_items) = self.evaluate(catalog, order);

        let disposition = match evaluation {
            Evaluation::Accept { decrements } => {
                let levels: Vec<InventoryLevel> = decrements
                    .iter()
                    .map(|decrement| InventoryLevel {
                        sku: decrement.sku.clone(),
                        current_quantity: decrement.new_quantity,
                        discontinued: false,
                    })
                    .collect();
                if !levels.is_empty() {
                    send(sink, MarketplaceRequest::InventoryUpdate { levels }, issued).await?;
                }
                apply_decrements(catalog, &decrements)?;
                order.transition(OrderState::Processing)?;

                send(
                    sink,
                    MarketplaceRequest::Accept {
                        order_id: order.id.clone(),
                    },
                    issued,
                )
                .await?;
                Disposition::Accepted
            }
            Evaluation::Backorder { items } => {
                send(
                    sink,
                    MarketplaceRequest::Backorder {
                        order_id: order.id.clone(),
                        items,
                    },
                    issued,
                )
                .await?;
                order.transition(OrderState::Backordered)?;
                Disposition::Backordered
            }
        };

        tracing::debug!(order_id = %order.id, ?disposition, "order decided");
        Ok(OrderDecision {
            order_id: order.id.clone(),
            disposition,
            unresolved_items,
        })
    }

    /// Check an order against current stock without touching anything.
    ///
    /// Items of the same order that share an option are checked against
    /// their combined quantity.
    fn evaluate(&self, catalog: &Catalog, order: &Order) -> (Evaluation, Vec<String>) {
        let mut unresolved = Vec::new();
        let mut short = Vec::new();
        let mut demand: IndexMap<(&str, &str), u64> = IndexMap::new();

        for item in order.items.values() {
            let Some(option) = catalog.option(&item.product_id, &item.product_option_id) else {
                let err = AppError::DataInconsistency(format!(
                    "order {} item {} references unknown option {}/{}",
                    order.id, item.id, item.product_id, item.product_option_id
                ));
                tracing::warn!(order_id = %order.id, item_id = %item.id, policy = ?self.policy, "{}", err);
                unresolved.push(item.id.clone());
                if self.policy == UnresolvedItemPolicy::BackorderOrder {
                    short.push(BackorderedItem {
                        item_id: item.id.clone(),
                        available_quantity: 0,
                        discontinued: false,
                    });
                }
                continue;
            };

            let requested = demand
                .entry((item.product_id.as_str(), item.product_option_id.as_str()))
                .or_insert(0);
            *requested += u64::from(item.quantity);
            if u64::from(option.available_quantity) < *requested {
                short.push(BackorderedItem {
                    item_id: item.id.clone(),
                    available_quantity: option.available_quantity,
                    discontinued: false,
                });
            }
        }

        if !short.is_empty() {
            return (Evaluation::Backorder { items: short }, unresolved);
        }

        let decrements = demand
            .into_iter()
            .filter_map(|((product_id, option_id), requested)| {
                let option = catalog.option(product_id, option_id)?;
                let sku = option.sku.clone()?;
                // demand never exceeds stock here
                let new_quantity = u64::from(option.available_quantity).saturating_sub(requested) as u32;
                Some(Decrement {
                    product_id: product_id.to_string(),
                    option_id: option_id.to_string(),
                    sku,
                    new_quantity,
                })
            })
            .collect();
        (Evaluation::Accept { decrements }, unresolved)
    }
}

/// NEW orders sorted by creation time; ties keep fetch order
fn pending_orders(orders: &[Order]) -> Vec<usize> {
    let mut pending: Vec<usize> = orders
        .iter()
        .enumerate()
        .filter(|(_, order)| order.is_new())
        .map(|(index, _)| index)
        .collect();
    pending.sort_by_key(|&index| orders[index].created_at);
    pending
}

async fn send<S>(
    sink: &mut S,
    request: MarketplaceRequest,
    issued: &mut Vec<MarketplaceRequest>,
) -> AppResult<()>
where
    S: RequestSink + ?Sized,
{
    sink.send(&request).await?;
    issued.push(request);
    Ok(())
}

fn apply_decrements(catalog: &mut Catalog, decrements: &[Decrement]) -> AppResult<()> {
    for decrement in decrements {
        let option = catalog
            .option_mut(&decrement.product_id, &decrement.option_id)
            .ok_or_else(|| {
                AppError::DataInconsistency(format!(
                    "option {}/{} vanished from the catalog",
                    decrement.product_id, decrement.option_id
                ))
            })?;
        option.available_quantity = decrement.new_quantity;
    }
    Ok(())
}
