//! etcd Cluster service definitions for quorumgate
//!
//! Defines:
//! - Membership message types matching `etcdserverpb` field numbers
//! - `ClusterClient` - unary gRPC client for `MemberList` and `MemberRemove`
//!
//! Only the slice of `rpc.proto` the webhook needs is modelled here, so the
//! crate builds without protoc.

pub mod v3 {
    /// Header attached to every etcd response.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResponseHeader {
        #[prost(uint64, tag = "1")]
        pub cluster_id: u64,
        #[prost(uint64, tag = "2")]
        pub member_id: u64,
        #[prost(int64, tag = "3")]
        pub revision: i64,
        #[prost(uint64, tag = "4")]
        pub raft_term: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Member {
        #[prost(uint64, tag = "1")]
        pub id: u64,
        /// Empty while the member has been added but not yet started.
        #[prost(string, tag = "2")]
        pub name: ::prost::alloc::string::String,
        #[prost(string, repeated, tag = "3")]
        pub peer_urls: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "4")]
        pub client_urls: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(bool, tag = "5")]
        pub is_learner: bool,
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct MemberListRequest {
        #[prost(bool, tag = "1")]
        pub linearizable: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MemberListResponse {
        #[prost(message, optional, tag = "1")]
        pub header: ::core::option::Option<ResponseHeader>,
        #[prost(message, repeated, tag = "2")]
        pub members: ::prost::alloc::vec::Vec<Member>,
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct MemberRemoveRequest {
        #[prost(uint64, tag = "1")]
        pub id: u64,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MemberRemoveResponse {
        #[prost(message, optional, tag = "1")]
        pub header: ::core::option::Option<ResponseHeader>,
        /// Members remaining after the removal.
        #[prost(message, repeated, tag = "2")]
        pub members: ::prost::alloc::vec::Vec<Member>,
    }

    pub mod cluster_client {
        use tonic::codegen::*;

        const SERVICE: &str = "etcdserverpb.Cluster";

        #[derive(Debug, Clone)]
        pub struct ClusterClient<T> {
            inner: tonic::client::Grpc<T>,
        }

        impl ClusterClient<tonic::transport::Channel> {
            /// Dial a single endpoint and wrap the resulting channel.
            pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
            where
                D: TryInto<tonic::transport::Endpoint>,
                D::Error: Into<StdError>,
            {
                let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
                Ok(Self::new(conn))
            }
        }

        impl<T> ClusterClient<T>
        where
            T: tonic::client::GrpcService<tonic::body::BoxBody>,
            T::Error: Into<StdError>,
            T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
            <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
        {
            pub fn new(inner: T) -> Self {
                Self {
                    inner: tonic::client::Grpc::new(inner),
                }
            }

            pub async fn member_list(
                &mut self,
                request: impl tonic::IntoRequest<super::MemberListRequest>,
            ) -> std::result::Result<tonic::Response<super::MemberListResponse>, tonic::Status>
            {
                self.ready().await?;
                let codec = tonic::codec::ProstCodec::default();
                let path = http::uri::PathAndQuery::from_static("/etcdserverpb.Cluster/MemberList");
                let mut req = request.into_request();
                req.extensions_mut()
                    .insert(GrpcMethod::new(SERVICE, "MemberList"));
                self.inner.unary(req, path, codec).await
            }

            pub async fn member_remove(
                &mut self,
                request: impl tonic::IntoRequest<super::MemberRemoveRequest>,
            ) -> std::result::Result<tonic::Response<super::MemberRemoveResponse>, tonic::Status>
            {
                self.ready().await?;
                let codec = tonic::codec::ProstCodec::default();
                let path =
                    http::uri::PathAndQuery::from_static("/etcdserverpb.Cluster/MemberRemove");
                let mut req = request.into_request();
                req.extensions_mut()
                    .insert(GrpcMethod::new(SERVICE, "MemberRemove"));
                self.inner.unary(req, path, codec).await
            }

            async fn ready(&mut self) -> std::result::Result<(), tonic::Status> {
                self.inner.ready().await.map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
                })
            }
        }
    }
}

pub use v3::cluster_client::ClusterClient;
pub use v3::*;
